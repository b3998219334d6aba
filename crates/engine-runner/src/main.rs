//! BlockForge Engine - Real-time relay for the multiplayer sandbox editor
//!
//! This crate is the *composition root* for the relay.
//! It wires the hub to the WebSocket route and starts the server.

mod run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run::run().await
}
