//! Room router - which map each connection currently occupies
//!
//! Room assignments partition every room-scoped broadcast. An assignment is
//! read fresh per recipient at dispatch time, never snapshotted, so a
//! connection that joins a different map mid-stream stops receiving the old
//! room's traffic immediately.

use std::collections::HashMap;

use crate::connections::ConnectionId;

#[derive(Debug, Default)]
pub struct RoomRouter {
    assignments: HashMap<ConnectionId, String>,
}

impl RoomRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a connection to a room. At connect this is the connection's
    /// own personal map; later reassigned by successful joins.
    pub fn assign(&mut self, connection_id: ConnectionId, map_id: String) {
        self.assignments.insert(connection_id, map_id);
    }

    /// The map a connection currently occupies.
    pub fn room_of(&self, connection_id: ConnectionId) -> Option<&str> {
        self.assignments.get(&connection_id).map(String::as_str)
    }

    /// Whether a connection is currently in the given room.
    pub fn is_in_room(&self, connection_id: ConnectionId, map_id: &str) -> bool {
        self.room_of(connection_id) == Some(map_id)
    }

    /// Drop a connection's assignment at disconnect.
    pub fn remove(&mut self, connection_id: ConnectionId) {
        self.assignments.remove(&connection_id);
    }
}
