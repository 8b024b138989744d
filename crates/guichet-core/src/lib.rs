// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Guichet ticketing server.
//!
//! This crate holds the domain model (categories, tickets, queues,
//! attendant sessions) and the [`Hall`] state machine the gateway drives.
//! Everything here is synchronous and I/O-free; the gateway crate owns the
//! transport and the single-writer dispatch loop.

pub mod category;
pub mod error;
pub mod hall;
pub mod queues;
pub mod sessions;
pub mod ticket;

// Re-export key items at crate root for ergonomic imports.
pub use category::Category;
pub use error::{GuichetError, HallError};
pub use hall::{Hall, HallEvent, HallRequest};
pub use queues::{QueueSnapshot, QueueStore};
pub use sessions::{AttendantSession, SessionRegistry};
pub use ticket::{Ticket, TicketFactory};
