//! Task repository: CRUD, filtered queries, and the overdue sweep.

use tw_core::entities::{Task, TaskRecord};
use tw_core::enums::TaskState;
use tw_core::time::format_timestamp;

use crate::TaskDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_enum, parse_optional_timestamp, parse_stored_timestamp};
use crate::query::{TaskFilter, TaskSort};

const SELECT_COLS: &str = "id, title, description, deadline, priority, type, state, nextTime";

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    let record = TaskRecord {
        id: Some(row.get::<i64>(0)?),
        title: row.get(1)?,
        description: get_opt_string(row, 2)?.unwrap_or_default(),
        deadline: parse_stored_timestamp(&row.get::<String>(3)?)?,
        priority: parse_enum(&row.get::<String>(4)?)?,
        task_type: parse_enum(&row.get::<String>(5)?)?,
        state: parse_enum(&row.get::<String>(6)?)?,
        reminder_time: parse_optional_timestamp(get_opt_string(row, 7)?.as_deref())?,
    };
    Task::restore(record)
        .map_err(|e| DatabaseError::Query(format!("Corrupt task row: {e}")))
}

/// Move every expired Pending task to Overdue. Caller holds the store lock.
async fn sweep_locked(conn: &libsql::Connection, now: &str) -> Result<u64, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE tasks SET state = ?1 WHERE state = ?2 AND deadline < ?3",
            libsql::params![
                TaskState::Overdue.as_str(),
                TaskState::Pending.as_str(),
                now
            ],
        )
        .await?;
    if changed > 0 {
        tracing::debug!(changed, now, "marked overdue tasks");
    }
    Ok(changed)
}

impl TaskDb {
    fn now_text(&self) -> String {
        format_timestamp(self.clock().now())
    }

    /// Persist a new task and return its store-assigned id.
    ///
    /// Any id already on `task` is ignored; the caller assigns the returned one.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if the task fails validation (nothing
    /// is written), or a storage error if the INSERT fails.
    pub async fn create(&self, task: &Task) -> Result<i64, DatabaseError> {
        task.validate()?;

        let conn = self.lock().await;
        let mut rows = conn
            .query(
                "INSERT INTO tasks (title, description, deadline, priority, type, state, nextTime)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING id",
                libsql::params![
                    task.title(),
                    task.description(),
                    format_timestamp(task.deadline()),
                    task.priority().as_str(),
                    task.task_type().as_str(),
                    task.state().as_str(),
                    format_timestamp(task.reminder_time())
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let id = row.get::<i64>(0)?;

        tracing::debug!(id, title = task.title(), "inserted task");
        Ok(id)
    }

    /// Fetch one task by id, after sweeping overdue tasks.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sweep or SELECT fails.
    pub async fn read(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let now = self.now_text();
        let conn = self.lock().await;
        sweep_locked(&conn, &now).await?;

        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    /// Replace every mutable column of the row identified by `task.id`.
    ///
    /// The sweep runs first, so an update that keeps an expired task Pending
    /// is written as given and only swept again on the next read.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if the task has no id or fails
    /// validation, `DatabaseError::NotFound` if no row has that id, or a
    /// storage error.
    pub async fn update(&self, task: &Task) -> Result<(), DatabaseError> {
        let id = task.id().ok_or_else(|| {
            DatabaseError::Validation("cannot update a task that was never persisted".into())
        })?;
        task.validate()?;

        let now = self.now_text();
        let conn = self.lock().await;
        sweep_locked(&conn, &now).await?;

        let changed = conn
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, deadline = ?3, priority = ?4,
                 type = ?5, state = ?6, nextTime = ?7 WHERE id = ?8",
                libsql::params![
                    task.title(),
                    task.description(),
                    format_timestamp(task.deadline()),
                    task.priority().as_str(),
                    task.task_type().as_str(),
                    task.state().as_str(),
                    format_timestamp(task.reminder_time()),
                    id
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(id));
        }

        tracing::debug!(id, state = %task.state(), "updated task");
        Ok(())
    }

    /// Remove a task. Deleting an id that does not exist succeeds silently.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sweep or DELETE fails.
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let now = self.now_text();
        let conn = self.lock().await;
        sweep_locked(&conn, &now).await?;

        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id]).await?;
        tracing::debug!(id, existed = changed > 0, "deleted task");
        Ok(())
    }

    /// Select tasks matching every field set in `filter`, ordered by `sort`
    /// (insertion order when `None`).
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sweep or SELECT fails, or if a row
    /// cannot be decoded.
    pub async fn query(
        &self,
        filter: &TaskFilter,
        sort: Option<TaskSort>,
    ) -> Result<Vec<Task>, DatabaseError> {
        let (where_clause, params) = filter.to_where_clause();
        let order_clause = TaskSort::to_order_clause(sort);
        let sql = format!("SELECT {SELECT_COLS} FROM tasks {where_clause} {order_clause}");

        let now = self.now_text();
        let conn = self.lock().await;
        sweep_locked(&conn, &now).await?;

        let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// Count tasks matching `filter`, after sweeping.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sweep or COUNT fails.
    pub async fn count(&self, filter: &TaskFilter) -> Result<u64, DatabaseError> {
        let (where_clause, params) = filter.to_where_clause();
        let sql = format!("SELECT COUNT(*) FROM tasks {where_clause}");

        let now = self.now_text();
        let conn = self.lock().await;
        sweep_locked(&conn, &now).await?;

        let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count).map_err(|e| DatabaseError::Query(format!("negative count: {e}")))
    }

    /// Run the overdue sweep on its own and return how many tasks changed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the UPDATE fails.
    pub async fn sweep_overdue(&self) -> Result<u64, DatabaseError> {
        let now = self.now_text();
        let conn = self.lock().await;
        sweep_locked(&conn, &now).await
    }
}
