// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-writer dispatcher task.
//!
//! Every connection pushes commands into one mpsc channel; one task owns
//! the [`Hall`] and consumes them in order. Each command is fully applied
//! and its event delivered before the next is dequeued, so dequeue-then-bind
//! and clear-then-enqueue transitions are atomic relative to each other and
//! broadcasts always reflect the post-mutation state.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

use guichet_core::Hall;

use crate::protocol::{ClientRequest, ServerEvent};

/// Map of connection id -> per-connection outbound sender.
pub type ConnMap = Arc<DashMap<String, mpsc::Sender<String>>>;

/// A command for the dispatcher, attributed to one connection.
#[derive(Debug)]
pub enum HallCommand {
    /// A connection opened: register its outbound sender and send it the
    /// current queue snapshot.
    ///
    /// Registration happens here, in command-stream order, so the first
    /// frame a connection sees is always `initial-state` -- a broadcast
    /// older than the snapshot can never reach it.
    Connected {
        conn_id: String,
        sender: mpsc::Sender<String>,
    },
    /// A parsed client request.
    Request {
        conn_id: String,
        request: ClientRequest,
    },
}

/// Run the dispatcher until every command sender is dropped.
///
/// Fan-out is at-most-once and best-effort: a connection whose outbound
/// buffer is full or gone simply misses the event.
pub async fn run_dispatcher(mut hall: Hall, mut rx: mpsc::Receiver<HallCommand>, conns: ConnMap) {
    info!("hall dispatcher started");

    while let Some(command) = rx.recv().await {
        match command {
            HallCommand::Connected { conn_id, sender } => {
                conns.insert(conn_id.clone(), sender);
                let event = ServerEvent::InitialState {
                    all_queues: hall.snapshot(),
                };
                send_to(&conns, &conn_id, &event);
            }
            HallCommand::Request { conn_id, request } => {
                let kind = request.kind();
                match hall.apply(request.into_hall_request()) {
                    Ok(event) => broadcast(&conns, &ServerEvent::from(event)),
                    Err(err) => {
                        warn!(conn = %conn_id, error = %err, "request rejected");
                        send_to(&conns, &conn_id, &kind.error_event(&err));
                    }
                }
            }
        }
    }

    info!("hall dispatcher stopped");
}

/// Deliver an event to exactly one connection.
fn send_to(conns: &ConnMap, conn_id: &str, event: &ServerEvent) {
    let Ok(payload) = serde_json::to_string(event) else {
        warn!("failed to serialize server event");
        return;
    };
    if let Some(sender) = conns.get(conn_id)
        && sender.try_send(payload).is_err()
    {
        warn!(conn = %conn_id, "dropping event for slow or closed connection");
    }
}

/// Deliver an event to every connected observer.
fn broadcast(conns: &ConnMap, event: &ServerEvent) {
    let Ok(payload) = serde_json::to_string(event) else {
        warn!("failed to serialize server event");
        return;
    };
    for entry in conns.iter() {
        if entry.value().try_send(payload.clone()).is_err() {
            warn!(conn = %entry.key(), "dropping event for slow or closed connection");
        }
    }
}
