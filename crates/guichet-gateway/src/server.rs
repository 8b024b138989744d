// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Binding and serving are
//! split so tests can bind port 0 and read the assigned address.

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use guichet_core::GuichetError;

use crate::dispatch::{ConnMap, HallCommand};
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Channel into the hall dispatcher task.
    pub hall_tx: mpsc::Sender<HallCommand>,
    /// Per-connection outbound senders.
    pub conns: ConnMap,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Bind the gateway listener.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, GuichetError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|e| GuichetError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Serve the gateway until `shutdown` resolves.
///
/// Routes:
/// - GET /ws      (WebSocket upgrade, one connection per observer)
/// - GET /health  (unauthenticated liveness + uptime)
///
/// CORS is permissive: counter displays are served from anywhere.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), GuichetError> {
    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("gateway listening on {addr}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GuichetError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn gateway_state_is_clone() {
        let (tx, _rx) = mpsc::channel(1);
        let state = GatewayState {
            hall_tx: tx,
            conns: Arc::new(dashmap::DashMap::new()),
            start_time: std::time::Instant::now(),
        };
        let _cloned = state.clone();
    }

    #[tokio::test]
    async fn bind_to_ephemeral_port_reports_address() {
        let listener = bind("127.0.0.1", 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn bind_to_invalid_host_fails_with_channel_error() {
        let err = bind("256.256.256.256", 0).await.unwrap_err();
        assert!(matches!(err, GuichetError::Channel { .. }));
    }
}
