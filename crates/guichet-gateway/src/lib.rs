// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket gateway for the Guichet ticketing server.
//!
//! Connections land on an axum WebSocket route; every parsed request is
//! pushed into one mpsc channel consumed by a single dispatcher task that
//! owns the [`Hall`](guichet_core::Hall). That task is the sole writer of
//! queue and session state, so no further locking exists anywhere.
//!
//! Delivery is at-most-once, best-effort fan-out to currently connected
//! observers; late joiners receive a point-in-time snapshot, not history.

pub mod dispatch;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod ws;

pub use dispatch::{ConnMap, HallCommand, run_dispatcher};
pub use protocol::{ClientRequest, RequestKind, ServerEvent, TicketRef};
pub use server::{GatewayState, bind, serve};
