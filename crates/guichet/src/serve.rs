// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guichet serve` command implementation.
//!
//! Wires the hall dispatcher to the WebSocket gateway and runs until
//! SIGINT/SIGTERM. All queue and session state lives in the dispatcher
//! task and resets on restart.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use guichet_config::GuichetConfig;
use guichet_core::{GuichetError, Hall};
use guichet_gateway::{ConnMap, GatewayState, run_dispatcher};

/// Runs the `guichet serve` command.
pub async fn run_serve(config: GuichetConfig) -> Result<(), GuichetError> {
    init_tracing(&config.log.level);

    info!("starting guichet serve");

    let (hall_tx, hall_rx) = mpsc::channel(256);
    let conns: ConnMap = Arc::new(DashMap::new());
    let dispatcher = tokio::spawn(run_dispatcher(Hall::new(), hall_rx, conns.clone()));

    let listener = guichet_gateway::bind(&config.server.host, config.server.port).await?;
    let state = GatewayState {
        hall_tx,
        conns,
        start_time: std::time::Instant::now(),
    };

    let shutdown = install_signal_handler();
    guichet_gateway::serve(listener, state, shutdown.cancelled_owned()).await?;

    // The server dropped every command sender, so the dispatcher drains
    // and exits on its own.
    dispatcher
        .await
        .map_err(|e| GuichetError::Internal(format!("dispatcher task failed: {e}")))?;

    info!("guichet stopped");
    Ok(())
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received. The handler task runs in the background until then.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to
/// guichet crates with `warn` for everything else.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("guichet={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
