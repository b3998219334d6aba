//! Hub - session lifecycle and partitioned message fan-out
//!
//! The hub is the single owner of all shared relay state. Transport tasks
//! feed it connect / message / disconnect events over one channel and the
//! hub processes them strictly in arrival order, each to completion, so no
//! two mutations can interleave and no locks are needed. Outbound delivery
//! goes through the per-connection senders held by the registry; a closed
//! recipient is skipped.

use tokio::sync::{mpsc, oneshot};

use blockforge_protocol::{ClientMessage, ServerMessage};

use crate::connections::{ConnectionId, ConnectionRegistry};
use crate::maps::{EditError, MapStore};
use crate::rooms::RoomRouter;

/// Events delivered to the hub by the transport layer.
#[derive(Debug)]
pub enum HubEvent {
    /// A WebSocket finished its handshake; reply carries the assigned id.
    Connect {
        sender: mpsc::UnboundedSender<ServerMessage>,
        reply: oneshot::Sender<ConnectionId>,
    },
    /// A parsed inbound message from a live connection.
    Message {
        connection_id: ConnectionId,
        message: ClientMessage,
    },
    /// The transport reported closure.
    Disconnect { connection_id: ConnectionId },
}

/// Cloneable front door to the hub, held by every transport task.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    /// Register a new connection and wait for its identity.
    ///
    /// Returns `None` only if the hub task is gone, i.e. during shutdown.
    pub async fn connect(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Option<ConnectionId> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubEvent::Connect { sender, reply }).ok()?;
        rx.await.ok()
    }

    pub fn message(&self, connection_id: ConnectionId, message: ClientMessage) {
        let _ = self.tx.send(HubEvent::Message {
            connection_id,
            message,
        });
    }

    pub fn disconnect(&self, connection_id: ConnectionId) {
        let _ = self.tx.send(HubEvent::Disconnect { connection_id });
    }
}

/// The relay core: connection registry, map store, and room router, owned
/// together and mutated only from the hub's event loop.
#[derive(Debug, Default)]
pub struct Hub {
    registry: ConnectionRegistry,
    maps: MapStore,
    rooms: RoomRouter,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the hub event loop and return its handle.
    pub fn start(self) -> HubHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(rx));
        HubHandle { tx }
    }

    /// Process events until every handle is dropped.
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<HubEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                HubEvent::Connect { sender, reply } => {
                    let id = self.handle_connect(sender);
                    let _ = reply.send(id);
                }
                HubEvent::Message {
                    connection_id,
                    message,
                } => self.handle_message(connection_id, message),
                HubEvent::Disconnect { connection_id } => self.handle_disconnect(connection_id),
            }
        }
        tracing::debug!("Hub event loop stopped");
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    fn handle_connect(&mut self, sender: mpsc::UnboundedSender<ServerMessage>) -> ConnectionId {
        let id = self.registry.register(sender);
        let map_id = self.maps.create_personal(id);
        self.rooms.assign(id, map_id.clone());

        self.registry.send_to(id, ServerMessage::Id { id });
        self.registry.send_to(
            id,
            ServerMessage::LoadMap {
                blocks: Vec::new(),
                map_id,
                can_edit: true,
            },
        );
        self.registry.send_to(
            id,
            ServerMessage::MapsList {
                maps: self.maps.map_names(),
            },
        );

        self.broadcast_all(ServerMessage::PlayerCount {
            count: self.registry.count(),
        });

        tracing::info!(connection_id = id, "Client connected");
        id
    }

    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        self.maps.remove_personal(connection_id);
        self.rooms.remove(connection_id);
        if self.registry.unregister(connection_id).is_none() {
            return;
        }
        tracing::info!(connection_id, "Client disconnected");

        self.broadcast_all(ServerMessage::PlayerLeft { id: connection_id });
        self.broadcast_all(ServerMessage::PlayerCount {
            count: self.registry.count(),
        });
    }

    // =========================================================================
    // Message dispatch
    // =========================================================================

    fn handle_message(&mut self, connection_id: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::Update {
                position,
                rotation,
                is_grounded,
                animation_time,
                player_name,
                player_color,
            } => {
                if let Some(color) = player_color {
                    self.registry.set_color(connection_id, color);
                }
                let Some(room) = self.rooms.room_of(connection_id).map(str::to_string) else {
                    return;
                };
                self.broadcast_room(
                    &room,
                    connection_id,
                    ServerMessage::Update {
                        id: connection_id,
                        position,
                        rotation,
                        is_grounded,
                        animation_time,
                        player_name,
                        player_color: self.registry.color(connection_id),
                    },
                );
            }

            ClientMessage::BlockUpdate {
                map_id,
                action,
                block,
            } => match self
                .maps
                .apply_block_update(connection_id, &map_id, action, block)
            {
                Ok(block) => {
                    self.broadcast_room(
                        &map_id,
                        connection_id,
                        ServerMessage::BlockUpdate {
                            action,
                            block,
                            map_id: map_id.clone(),
                        },
                    );
                }
                Err(e @ EditError::BlockNotFound { .. }) => {
                    tracing::debug!(connection_id, error = %e, "Dropped block update");
                }
                Err(e) => {
                    tracing::warn!(connection_id, error = %e, "Rejected block update");
                }
            },

            ClientMessage::CreateMap {
                map_id,
                map_name,
                blocks,
            } => match self.maps.create_public(&map_id, &map_name, connection_id, blocks) {
                Ok(()) => {
                    self.broadcast_all(ServerMessage::MapsList {
                        maps: self.maps.map_names(),
                    });
                }
                Err(e) => {
                    tracing::warn!(connection_id, error = %e, "Rejected map creation");
                }
            },

            ClientMessage::JoinMap { map_id } => {
                let resolved = self.maps.resolve_display_name(&map_id);
                match self.maps.get(&resolved).cloned() {
                    Some(blocks) => {
                        self.rooms.assign(connection_id, resolved.clone());
                        let can_edit = self.maps.can_edit_on_join(connection_id, &resolved);
                        self.registry.send_to(
                            connection_id,
                            ServerMessage::LoadMap {
                                blocks,
                                map_id: resolved,
                                can_edit,
                            },
                        );
                    }
                    None => {
                        // Silent failure per protocol: no reply message exists.
                        tracing::debug!(connection_id, map_id = %map_id, "Join of unknown map ignored");
                    }
                }
            }

            ClientMessage::RequestMapsList => {
                self.registry.send_to(
                    connection_id,
                    ServerMessage::MapsList {
                        maps: self.maps.map_names(),
                    },
                );
            }

            ClientMessage::Chat { message, sender } => {
                let Some(room) = self.rooms.room_of(connection_id).map(str::to_string) else {
                    return;
                };
                self.broadcast_room(
                    &room,
                    connection_id,
                    ServerMessage::Chat {
                        message,
                        sender,
                        id: connection_id,
                    },
                );
            }
        }
    }

    // =========================================================================
    // Fan-out
    // =========================================================================

    /// Deliver to every live connection.
    fn broadcast_all(&self, message: ServerMessage) {
        for id in self.registry.ids() {
            self.registry.send_to(id, message.clone());
        }
    }

    /// Deliver to every live connection currently assigned to `map_id`,
    /// excluding the originator. Assignments are read per recipient at
    /// dispatch time.
    fn broadcast_room(&self, map_id: &str, except: ConnectionId, message: ServerMessage) {
        for id in self.registry.ids() {
            if id != except && self.rooms.is_in_room(id, map_id) {
                self.registry.send_to(id, message.clone());
            }
        }
    }
}
