//! Cross-cutting error types for taskwatch.
//!
//! Errors raised while building or mutating domain values. Lookup and storage
//! errors live in `tw-db` as `DatabaseError`, which converts from `CoreError`.

use thiserror::Error;

/// Errors that can be raised by any taskwatch crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (empty title, unknown enum value, bad timestamp).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation conflicts with the current state of a value.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
