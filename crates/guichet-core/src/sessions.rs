// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendant session registry.
//!
//! A session binds an attendant identity to a counter and, while a ticket
//! is in service, to that ticket. Sessions are created implicitly on first
//! bind and never removed implicitly: a dropped connection leaves its
//! session (and any held ticket) in place. [`SessionRegistry::remove`] is
//! the explicit cleanup hook for deployments that want expiry.

use std::collections::HashMap;

use crate::ticket::Ticket;

/// Runtime binding of one attendant to a counter and an optional ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendantSession {
    pub counter_id: String,
    pub current_ticket: Option<Ticket>,
}

/// Tracks every attendant session, keyed by attendant id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, AttendantSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a ticket to an attendant, creating the session if absent.
    ///
    /// Overwrites any previously held ticket without complaint; an
    /// attendant abandoning an unfinished ticket by calling the next one
    /// is accepted behavior, not guarded against.
    pub fn bind(&mut self, attendant_id: &str, counter_id: &str, ticket: Ticket) {
        let session = self
            .sessions
            .entry(attendant_id.to_string())
            .or_insert_with(|| AttendantSession {
                counter_id: counter_id.to_string(),
                current_ticket: None,
            });
        session.counter_id = counter_id.to_string();
        session.current_ticket = Some(ticket);
    }

    /// Release the attendant's held ticket, preserving the counter binding.
    ///
    /// Returns the ticket that was held, if any.
    pub fn clear(&mut self, attendant_id: &str) -> Option<Ticket> {
        self.sessions
            .get_mut(attendant_id)
            .and_then(|session| session.current_ticket.take())
    }

    /// The ticket the attendant currently holds, if any.
    pub fn current(&self, attendant_id: &str) -> Option<&Ticket> {
        self.sessions
            .get(attendant_id)
            .and_then(|session| session.current_ticket.as_ref())
    }

    /// Authorization check for finish/redirect: the session exists, holds
    /// a ticket, and that ticket's number equals `number`. Identity is by
    /// number alone, not category or object identity.
    pub fn matches(&self, attendant_id: &str, number: &str) -> bool {
        self.current(attendant_id)
            .is_some_and(|ticket| ticket.number == number)
    }

    /// Remove a session entirely.
    ///
    /// Extension point for session expiry. Nothing in the server calls
    /// this on disconnect; a stranded session is the documented default.
    pub fn remove(&mut self, attendant_id: &str) -> Option<AttendantSession> {
        self.sessions.remove(attendant_id)
    }

    /// Number of known sessions (including ticket-less ones).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterate over currently held tickets (for conservation checks).
    pub fn held_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.sessions
            .values()
            .filter_map(|session| session.current_ticket.as_ref())
    }
}
