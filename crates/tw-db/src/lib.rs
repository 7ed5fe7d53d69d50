//! # tw-db
//!
//! libSQL task store for taskwatch.
//!
//! Owns the `tasks` table and the overdue rule: before every read-path
//! operation the store moves expired Pending tasks to Overdue. All operations,
//! the sweep included, run under one async mutex per store instance, so a
//! sweep and the read that follows it are observed together.
//!
//! Uses the `libsql` crate (C `SQLite` fork) in local-only mode.

pub mod error;
pub mod helpers;
mod migrations;
pub mod query;
pub mod repos;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};
use tw_core::clock::{Clock, SystemClock};

pub use query::{SortField, SortOrder, TaskFilter, TaskSort};

/// Durable task repository backed by a single libSQL connection.
///
/// Cheap to share behind an `Arc`; every method serializes on the inner lock.
pub struct TaskDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Mutex<libsql::Connection>,
    clock: Arc<dyn Clock>,
}

impl TaskDb {
    /// Open a local database at `path` using host local time for the sweep.
    ///
    /// Runs migrations automatically on first open. Pass `":memory:"` for an
    /// ephemeral store.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_local_with_clock(path, Arc::new(SystemClock)).await
    }

    /// Open a local database whose sweep compares deadlines against `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::open_local`].
    pub async fn open_local_with_clock(
        path: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let task_db = Self {
            db,
            conn: Mutex::new(conn),
            clock,
        };
        task_db.run_migrations().await?;
        tracing::debug!(path, "opened task store");
        Ok(task_db)
    }

    /// The clock the overdue sweep compares deadlines against.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Enter the store's mutual-exclusion scope.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, libsql::Connection> {
        self.conn.lock().await
    }
}
