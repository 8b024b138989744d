// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service categories.
//!
//! The category set is a closed enumeration: every queue, ticket prefix,
//! and wire payload is keyed by one of these variants. Unknown category
//! strings coming off the wire are rejected at the hall boundary with
//! [`HallError::InvalidCategory`](crate::error::HallError::InvalidCategory),
//! never by a silent parse drop.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A named class of service with its own FIFO queue and ticket prefix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
pub enum Category {
    Normal,
    Priority,
    Pickup,
}

impl Category {
    /// All categories in declaration order (the order queues render in).
    pub const ALL: [Category; 3] = [Category::Normal, Category::Priority, Category::Pickup];

    /// Single-letter display prefix for ticket numbers.
    ///
    /// Pickup keeps `R` (from "retirada" in the deployment this system
    /// was built for) so printed tickets stay compatible.
    pub fn prefix(self) -> char {
        match self {
            Category::Normal => 'N',
            Category::Priority => 'P',
            Category::Pickup => 'R',
        }
    }
}
