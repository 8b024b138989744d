// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler: one connection per observer or attendant client.
//!
//! Each connection gets a uuid, an outbound mpsc, and a forwarder task
//! draining that mpsc into the socket. The sender is handed to the
//! dispatcher inside [`HallCommand::Connected`], which registers it and
//! emits the snapshot in one step, so the first frame a client sees is
//! always `initial-state`. Inbound text frames parse as
//! [`ClientRequest`]; malformed or
//! unrecognized messages are logged and ignored. Closing the socket only
//! deregisters the outbound sender -- attendant sessions are left in place.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::dispatch::HallCommand;
use crate::protocol::ClientRequest;
use crate::server::GatewayState;

/// WebSocket upgrade handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let conn_id = uuid::Uuid::new_v4().to_string();

    let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(64);
    debug!(conn = %conn_id, "connection opened");

    // Forward dispatcher output to the socket.
    let sender_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Late joiners get a point-in-time snapshot, not history. The dispatcher
    // registers the sender and emits the snapshot in command-stream order,
    // so no broadcast can reach this connection ahead of it.
    if state
        .hall_tx
        .send(HallCommand::Connected {
            conn_id: conn_id.clone(),
            sender: tx,
        })
        .await
        .is_err()
    {
        warn!(conn = %conn_id, "dispatcher unavailable, closing connection");
        sender_task.abort();
        return;
    }

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let request: ClientRequest = match serde_json::from_str(&text) {
                    Ok(request) => request,
                    Err(e) => {
                        // Fail silent toward the client, per protocol.
                        warn!(conn = %conn_id, "ignoring malformed message: {e}");
                        continue;
                    }
                };

                if state
                    .hall_tx
                    .send(HallCommand::Request {
                        conn_id: conn_id.clone(),
                        request,
                    })
                    .await
                    .is_err()
                {
                    warn!(conn = %conn_id, "dispatcher unavailable");
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {} // Ignore binary, ping (handled by the protocol layer)
        }
    }

    // Cleanup deregisters the outbound sender only. Sessions held by this
    // attendant stay bound; see SessionRegistry::remove for explicit expiry.
    state.conns.remove(&conn_id);
    sender_task.abort();
    debug!(conn = %conn_id, "connection closed");
}
