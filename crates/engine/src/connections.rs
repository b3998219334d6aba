//! Connection registry - identities and per-connection transient state
//!
//! Identities are monotonically increasing integers, unique for the
//! process lifetime: an id is never reissued, even after its connection
//! disconnects. The registry also holds each connection's outbound message
//! channel and its last-seen display color.

use std::collections::HashMap;

use tokio::sync::mpsc;

use blockforge_protocol::ServerMessage;

/// Process-unique connection identity.
pub type ConnectionId = u64;

/// Per-connection state tracked by the registry.
#[derive(Debug)]
pub struct ConnectionInfo {
    /// Channel to send messages to this connection
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Last player color sent by this connection, if any
    pub color: Option<String>,
}

/// Registry of live connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: ConnectionId,
    connections: HashMap<ConnectionId, ConnectionInfo>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and issue its identity.
    ///
    /// Ids start at 1 and strictly increase.
    pub fn register(&mut self, sender: mpsc::UnboundedSender<ServerMessage>) -> ConnectionId {
        self.next_id += 1;
        let id = self.next_id;
        self.connections
            .insert(id, ConnectionInfo { sender, color: None });
        tracing::debug!(connection_id = id, "Registered new connection");
        id
    }

    /// Remove a connection and all its per-connection attributes.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<ConnectionInfo> {
        let info = self.connections.remove(&id);
        if info.is_some() {
            tracing::debug!(connection_id = id, "Unregistered connection");
        }
        info
    }

    /// Number of live connections, used for presence reporting.
    pub fn count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_live(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// All live connection ids, for broadcast enumeration.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }

    /// Record the display color a connection last sent.
    pub fn set_color(&mut self, id: ConnectionId, color: String) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.color = Some(color);
        }
    }

    pub fn color(&self, id: ConnectionId) -> Option<String> {
        self.connections.get(&id).and_then(|c| c.color.clone())
    }

    /// Send a message to one connection.
    ///
    /// A connection whose receiver is gone is skipped; closure is learned
    /// from the transport, not from failed sends.
    pub fn send_to(&self, id: ConnectionId, message: ServerMessage) {
        if let Some(conn) = self.connections.get(&id) {
            let _ = conn.sender.send(message);
        }
    }
}
