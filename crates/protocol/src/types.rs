//! Block geometry vocabulary shared by every message that carries map content.
//!
//! `Block` is also the single normalization point for client-supplied
//! geometry: `geometry`, `scale`, and `isKiller` get their documented
//! defaults during deserialization, so every ingestion path (block add,
//! map creation) produces a fully-populated block.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key prefix reserved for per-connection personal maps.
///
/// Public map ids must never carry this prefix; the map store rejects
/// creations that do.
pub const PERSONAL_MAP_PREFIX: &str = "personal_";

/// A 3-component vector (position, rotation, or scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The default scale for a block that did not specify one.
    pub const fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// The three components, for per-axis validation.
    pub fn axes(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Client-supplied block identifier.
///
/// Clients are free to use numbers or strings; the server only ever
/// compares ids for equality, so both are carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Number(n) => n.fmt(f),
            BlockId::Text(s) => s.fmt(f),
        }
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        BlockId::Text(s.to_string())
    }
}

impl From<i64> for BlockId {
    fn from(n: i64) -> Self {
        BlockId::Number(n.into())
    }
}

/// One placeable block inside a map.
///
/// Ids are unique per map by client convention only; the server does not
/// enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(default = "default_geometry")]
    pub geometry: String,
    pub position: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(default = "Vec3::one")]
    pub scale: Vec3,
    #[serde(default)]
    pub is_killer: bool,
}

fn default_geometry() -> String {
    "box".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_deserialization_fills_defaults() {
        let block: Block = serde_json::from_str(
            r#"{"id": 7, "position": {"x": 1.0, "y": 2.0, "z": 3.0}}"#,
        )
        .unwrap();

        assert_eq!(block.id, BlockId::from(7));
        assert_eq!(block.geometry, "box");
        assert_eq!(block.scale, Vec3::one());
        assert!(!block.is_killer);
        assert!(block.rotation.is_none());
    }

    #[test]
    fn block_keeps_explicit_fields() {
        let block: Block = serde_json::from_str(
            r#"{
                "id": "b-1",
                "geometry": "ramp",
                "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                "rotation": {"x": 0.0, "y": 90.0, "z": 0.0},
                "scale": {"x": 2.0, "y": 0.5, "z": 2.0},
                "isKiller": true
            }"#,
        )
        .unwrap();

        assert_eq!(block.id, BlockId::from("b-1"));
        assert_eq!(block.geometry, "ramp");
        assert_eq!(block.scale, Vec3::new(2.0, 0.5, 2.0));
        assert!(block.is_killer);
    }

    #[test]
    fn block_id_accepts_numbers_and_strings() {
        let numeric: BlockId = serde_json::from_str("42").unwrap();
        let text: BlockId = serde_json::from_str("\"42\"").unwrap();
        assert_ne!(numeric, text);
        assert_eq!(numeric, BlockId::from(42));
    }

    #[test]
    fn serialized_block_uses_wire_field_names() {
        let block = Block {
            id: BlockId::from(1),
            geometry: "box".to_string(),
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: None,
            scale: Vec3::one(),
            is_killer: true,
        };

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["isKiller"], serde_json::json!(true));
        assert!(json.get("rotation").is_none());
    }
}
