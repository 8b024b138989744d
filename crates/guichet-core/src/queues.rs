// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-category FIFO queues of waiting tickets.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::HallError;
use crate::ticket::Ticket;

/// Owns one FIFO queue per category.
///
/// Insertion order is call order; the only permitted mutations are a head
/// removal (call) and a tail append (generate, or redirect re-enqueue).
#[derive(Debug)]
pub struct QueueStore {
    queues: BTreeMap<Category, VecDeque<Ticket>>,
}

impl QueueStore {
    /// Create the store with an empty queue for every category.
    pub fn new() -> Self {
        Self {
            queues: Category::ALL
                .into_iter()
                .map(|category| (category, VecDeque::new()))
                .collect(),
        }
    }

    /// Append a ticket to the tail of its target queue.
    pub fn enqueue(&mut self, category: Category, ticket: Ticket) {
        self.queues.entry(category).or_default().push_back(ticket);
    }

    /// Remove and return the head of a queue.
    pub fn dequeue_front(&mut self, category: Category) -> Result<Ticket, HallError> {
        self.queues
            .get_mut(&category)
            .and_then(VecDeque::pop_front)
            .ok_or(HallError::EmptyQueue(category))
    }

    /// Number of waiting tickets in a category.
    pub fn len(&self, category: Category) -> usize {
        self.queues.get(&category).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.len(category) == 0
    }

    /// Deep copy of every queue for broadcast payloads.
    ///
    /// Copy-on-read: later store mutations cannot alter a snapshot that has
    /// already been handed to the broadcaster.
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot(
            self.queues
                .iter()
                .map(|(category, queue)| (*category, queue.iter().cloned().collect()))
                .collect(),
        )
    }
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of all queues, keyed by category name on the wire:
/// `{"Normal": [...], "Priority": [...], "Pickup": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueSnapshot(pub BTreeMap<Category, Vec<Ticket>>);

impl QueueSnapshot {
    pub fn waiting(&self, category: Category) -> &[Ticket] {
        self.0.get(&category).map_or(&[], Vec::as_slice)
    }
}
