//! Database error types for tw-db.
//!
//! Three classes reach callers: validation (`Validation`, `InvalidTransition`),
//! lookup (`NotFound`), and storage (everything else).

use thiserror::Error;
use tw_core::errors::CoreError;

/// Errors from task store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A task field failed validation; nothing was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested state change is not allowed for the task's current state.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// No task with this id exists.
    #[error("Task not found: {0}")]
    NotFound(i64),

    /// A SQL query failed or returned data that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidTransition(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the failure came from the persistence layer rather than the caller.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        !self.is_validation() && !self.is_not_found()
    }
}

impl From<CoreError> for DatabaseError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(msg) => Self::Validation(msg),
            e @ (CoreError::InvalidTransition { .. } | CoreError::InvalidState(_)) => {
                Self::InvalidTransition(e.to_string())
            }
            CoreError::Other(e) => Self::Other(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_class() {
        let e: DatabaseError = CoreError::Validation("title".into()).into();
        assert!(e.is_validation());

        let e: DatabaseError = CoreError::InvalidTransition {
            entity_type: "task".into(),
            id: "1".into(),
            from: "Finished".into(),
            to: "Finished".into(),
        }
        .into();
        assert!(matches!(e, DatabaseError::InvalidTransition(_)));
        assert!(!e.is_storage());
    }

    #[test]
    fn classes_are_disjoint() {
        assert!(DatabaseError::NotFound(3).is_not_found());
        assert!(!DatabaseError::NotFound(3).is_storage());
        assert!(DatabaseError::Query("boom".into()).is_storage());
        assert!(DatabaseError::NoResult.is_storage());
    }
}
