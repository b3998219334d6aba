//! WebSocket message types exchanged between the relay engine and clients.
//!
//! Both unions are closed: a frame whose `type` tag is not listed here
//! fails deserialization, which the engine logs and drops without touching
//! the connection.

use serde::{Deserialize, Serialize};

use crate::types::{Block, Vec3};

// =============================================================================
// Client Messages (Client → Engine)
// =============================================================================

/// Messages from a client to the relay engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Position/pose update, relayed to everyone else in the same room.
    #[serde(rename_all = "camelCase")]
    Update {
        position: Vec3,
        #[serde(default)]
        rotation: Option<Vec3>,
        #[serde(default)]
        is_grounded: bool,
        #[serde(default)]
        animation_time: f64,
        #[serde(default)]
        player_name: Option<String>,
        #[serde(default)]
        player_color: Option<String>,
    },
    /// Mutate one block of a map, subject to edit authority.
    #[serde(rename_all = "camelCase")]
    BlockUpdate {
        map_id: String,
        action: BlockAction,
        block: Block,
    },
    /// Create a named public map from an initial block set.
    #[serde(rename_all = "camelCase")]
    CreateMap {
        map_id: String,
        map_name: String,
        #[serde(default)]
        blocks: Vec<Block>,
    },
    /// Join a map by raw id or public display name.
    #[serde(rename_all = "camelCase")]
    JoinMap { map_id: String },
    /// Ask for the current public map listing.
    RequestMapsList,
    /// Room-scoped chat.
    Chat { message: String, sender: String },
}

/// The three block mutations a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockAction {
    Add,
    Remove,
    Scale,
}

// =============================================================================
// Server Messages (Engine → Client)
// =============================================================================

/// Messages from the relay engine to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Identity assignment, sent once right after connect.
    Id { id: u64 },
    /// Full block state of the room the client just entered.
    #[serde(rename_all = "camelCase")]
    LoadMap {
        blocks: Vec<Block>,
        map_id: String,
        can_edit: bool,
    },
    /// Display names of all public maps.
    MapsList { maps: Vec<String> },
    /// Live connection count, recomputed at send time.
    PlayerCount { count: usize },
    /// Another player's position/pose, relayed within the room.
    #[serde(rename_all = "camelCase")]
    Update {
        id: u64,
        position: Vec3,
        #[serde(default)]
        rotation: Option<Vec3>,
        is_grounded: bool,
        animation_time: f64,
        #[serde(default)]
        player_name: Option<String>,
        #[serde(default)]
        player_color: Option<String>,
    },
    /// A block mutation applied to the room's map.
    #[serde(rename_all = "camelCase")]
    BlockUpdate {
        action: BlockAction,
        block: Block,
        map_id: String,
    },
    /// Room-scoped chat, with the sender's connection id attached.
    Chat {
        message: String,
        sender: String,
        id: u64,
    },
    /// A connection went away.
    #[serde(rename_all = "camelCase")]
    PlayerLeft { id: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockId;

    #[test]
    fn client_tags_match_wire_protocol() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "joinMap", "mapId": "personal_3"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::JoinMap { map_id } if map_id == "personal_3"));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "requestMapsList"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::RequestMapsList));
    }

    #[test]
    fn block_update_parses_action_and_block() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{
                "type": "blockUpdate",
                "mapId": "m1",
                "action": "add",
                "block": {"id": 1, "position": {"x": 0.0, "y": 0.0, "z": 0.0}}
            }"#,
        )
        .unwrap();

        match msg {
            ClientMessage::BlockUpdate {
                map_id,
                action,
                block,
            } => {
                assert_eq!(map_id, "m1");
                assert_eq!(action, BlockAction::Add);
                assert_eq!(block.id, BlockId::from(1));
                assert_eq!(block.geometry, "box");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type": "teleport"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn server_messages_serialize_with_camel_case_tags() {
        let json = serde_json::to_value(ServerMessage::PlayerCount { count: 4 }).unwrap();
        assert_eq!(json["type"], "playerCount");
        assert_eq!(json["count"], 4);

        let json = serde_json::to_value(ServerMessage::LoadMap {
            blocks: vec![],
            map_id: "personal_1".to_string(),
            can_edit: true,
        })
        .unwrap();
        assert_eq!(json["type"], "loadMap");
        assert_eq!(json["mapId"], "personal_1");
        assert_eq!(json["canEdit"], true);

        let json = serde_json::to_value(ServerMessage::PlayerLeft { id: 9 }).unwrap();
        assert_eq!(json["type"], "playerLeft");
    }
}
