// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tickets and the per-category ticket factory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// An immutable unit of service demand.
///
/// The number is unique within its category for the process lifetime and
/// survives redirects unchanged, as does `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Category prefix + zero-padded sequence, e.g. `N001`.
    pub number: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

/// Issues tickets with strictly monotonic per-category sequence numbers.
///
/// Numbering is deliberately independent of queue length: a number issued
/// once is never issued again within a process lifetime, even after the
/// ticket is called or redirected away. See `numbers_not_reused_after_call`
/// in the hall tests for the pinned behavior.
#[derive(Debug, Default)]
pub struct TicketFactory {
    counters: HashMap<Category, u32>,
}

impl TicketFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `category`, stamped with the current time.
    ///
    /// Sequences are zero-padded to three digits and widen naturally past
    /// 999. The caller is responsible for enqueuing the ticket.
    pub fn next(&mut self, category: Category) -> Ticket {
        let seq = self.counters.entry(category).or_insert(0);
        *seq += 1;
        Ticket {
            number: format!("{}{:03}", category.prefix(), seq),
            category,
            created_at: Utc::now(),
        }
    }
}
