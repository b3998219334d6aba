//! BlockForge Protocol - Wire types shared by the relay engine and clients
//!
//! This crate contains everything that crosses the WebSocket boundary:
//! - The tagged message unions (`ClientMessage`, `ServerMessage`)
//! - Block geometry types (`Block`, `BlockId`, `Vec3`)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Wire fidelity** - camelCase tags and fields, exactly as clients send them

pub mod messages;
pub mod types;

pub use messages::{BlockAction, ClientMessage, ServerMessage};
pub use types::{Block, BlockId, Vec3, PERSONAL_MAP_PREFIX};
