// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Guichet ticketing server.

use thiserror::Error;

use crate::category::Category;

/// Request-scoped validation failures produced by the ticket hall.
///
/// All variants are recoverable: the failed request mutates nothing, the
/// error is reported only to the requesting connection, and the process
/// keeps serving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HallError {
    /// The category name is not a member of the fixed set.
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// A call was issued against a category with no waiting tickets.
    #[error("no tickets waiting in the {0} queue")]
    EmptyQueue(Category),

    /// Finish/redirect requested by an attendant whose session does not
    /// hold the named ticket.
    #[error("no matching ticket currently in service")]
    NoActiveTicket,
}

/// The primary error type for infrastructure failures (binding, serving,
/// channel plumbing). Hall validation errors never surface here.
#[derive(Debug, Error)]
pub enum GuichetError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Gateway/channel errors (bind failure, serve failure, closed channels).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hall_error_messages() {
        assert_eq!(
            HallError::InvalidCategory("VIP".into()).to_string(),
            "invalid category: VIP"
        );
        assert_eq!(
            HallError::EmptyQueue(Category::Priority).to_string(),
            "no tickets waiting in the Priority queue"
        );
        assert_eq!(
            HallError::NoActiveTicket.to_string(),
            "no matching ticket currently in service"
        );
    }

    #[test]
    fn guichet_error_variants_construct() {
        let _config = GuichetError::Config("bad port".into());
        let _channel = GuichetError::Channel {
            message: "bind failed".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _internal = GuichetError::Internal("test".into());
    }
}
