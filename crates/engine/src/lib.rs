//! BlockForge Engine - Session and room-broadcast core of the relay
//!
//! The engine owns all shared state (connection registry, map store, room
//! assignments) inside a single hub task fed by an event channel, so every
//! inbound message across all connections is processed to completion in
//! arrival order. The WebSocket adapter in [`websocket`] is the only
//! transport-facing piece; everything else is plain state and dispatch.

pub mod config;
pub mod connections;
pub mod hub;
pub mod maps;
pub mod rooms;
pub mod websocket;

pub use config::AppConfig;
pub use hub::{Hub, HubHandle};
