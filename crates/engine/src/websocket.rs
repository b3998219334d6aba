//! WebSocket adapter - the transport boundary of the relay
//!
//! Each accepted socket gets a forwarding task fed by its per-connection
//! channel; the receive loop parses frames and hands them to the hub.
//! Malformed frames are logged and dropped without touching the
//! connection.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use blockforge_protocol::{ClientMessage, ServerMessage};

use crate::hub::HubHandle;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Channel the hub uses to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let Some(connection_id) = hub.connect(tx).await else {
        // Hub is shutting down; drop the socket.
        return;
    };

    tracing::info!(connection_id, "New WebSocket connection established");

    // Forward hub messages out to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming frames
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => hub.message(connection_id, message),
                Err(e) => {
                    // Malformed or unknown-tag frame: log and keep the
                    // connection alive.
                    tracing::warn!(connection_id, error = %e, "Failed to parse message");
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id, "WebSocket connection closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id, error = %e, "WebSocket error");
                break;
            }
            // Ping/pong is handled by the protocol layer; binary is ignored.
            _ => {}
        }
    }

    hub.disconnect(connection_id);
    send_task.abort();

    tracing::info!(connection_id, "WebSocket connection terminated");
}
