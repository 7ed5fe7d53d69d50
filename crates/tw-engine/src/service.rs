//! Task service: the write path used by front ends.
//!
//! Every mutation goes to the store first and then refreshes the reminder
//! snapshot, whether or not the store call succeeded. A refresh failure is
//! logged and never masks the outcome of the mutation itself.

use std::sync::Arc;

use tracing::{info, warn};
use tw_config::TaskwatchConfig;
use tw_core::entities::Task;
use tw_core::enums::TaskType;
use tw_db::TaskDb;
use tw_db::error::DatabaseError;
use tw_db::query::{SortField, TaskFilter, TaskSort};

use crate::scheduler::{ReminderHandle, ReminderScheduler};

pub struct TaskService {
    store: Arc<TaskDb>,
    reminders: Arc<ReminderScheduler>,
}

impl TaskService {
    #[must_use]
    pub const fn new(store: Arc<TaskDb>, reminders: Arc<ReminderScheduler>) -> Self {
        Self { store, reminders }
    }

    /// Open the store named by `config`, build its scheduler, and load the
    /// initial reminder snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if `config` is invalid, otherwise a
    /// store error if the store cannot be opened or the first snapshot query
    /// fails.
    pub async fn open(config: &TaskwatchConfig) -> Result<Self, DatabaseError> {
        config
            .validate()
            .map_err(|e| DatabaseError::Validation(e.to_string()))?;
        let store = Arc::new(TaskDb::open_local(&config.store.path).await?);
        let reminders = Arc::new(ReminderScheduler::new(
            Arc::clone(&store),
            config.reminder.clone(),
        ));
        let pending = reminders.refresh().await?;
        info!(path = %config.store.path, pending, "task service ready");
        Ok(Self::new(store, reminders))
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<TaskDb> {
        &self.store
    }

    #[must_use]
    pub const fn reminders(&self) -> &Arc<ReminderScheduler> {
        &self.reminders
    }

    /// Start the background reminder loop.
    #[must_use]
    pub fn start_reminders(&self) -> ReminderHandle {
        self.reminders.spawn()
    }

    /// Persist a new task and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// `Validation` if the task already has an id or fails validation, or a
    /// storage error from the insert.
    pub async fn add(&self, task: Task) -> Result<Task, DatabaseError> {
        let result = self.insert(task).await;
        self.refresh_reminders().await;
        result
    }

    async fn insert(&self, mut task: Task) -> Result<Task, DatabaseError> {
        if let Some(id) = task.id() {
            return Err(DatabaseError::Validation(format!(
                "task {id} is already stored; use update"
            )));
        }
        let id = self.store.create(&task).await?;
        task.assign_id(id)?;
        Ok(task)
    }

    /// # Errors
    ///
    /// Propagates the store's `update` error unchanged.
    pub async fn update(&self, task: &Task) -> Result<(), DatabaseError> {
        let result = self.store.update(task).await;
        self.refresh_reminders().await;
        result
    }

    /// # Errors
    ///
    /// `Validation` if the task was never persisted, otherwise the store's
    /// `delete` error.
    pub async fn delete(&self, task: &Task) -> Result<(), DatabaseError> {
        let result = match task.id() {
            Some(id) => self.store.delete(id).await,
            None => Err(DatabaseError::Validation(
                "cannot delete a task that was never persisted".into(),
            )),
        };
        self.refresh_reminders().await;
        result
    }

    /// Mark the task with `id` finished and return its new state.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `InvalidTransition` if the task is
    /// already finished, or a storage error.
    pub async fn complete(&self, id: i64) -> Result<Task, DatabaseError> {
        let result = self.finish(id).await;
        self.refresh_reminders().await;
        result
    }

    async fn finish(&self, id: i64) -> Result<Task, DatabaseError> {
        let mut task = self
            .store
            .read(id)
            .await?
            .ok_or(DatabaseError::NotFound(id))?;
        task.mark_finished()?;
        self.store.update(&task).await?;
        Ok(task)
    }

    /// # Errors
    ///
    /// Returns a storage error from the read.
    pub async fn get(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        self.store.read(id).await
    }

    /// Pending tasks whose deadline falls on the clock's current date.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the query.
    pub async fn tasks_due_today(&self) -> Result<Vec<Task>, DatabaseError> {
        let today = self.store.clock().today();
        self.pending_by_deadline(TaskFilter::pending().with_deadline_on(today))
            .await
    }

    /// # Errors
    ///
    /// Returns a storage error from the query.
    pub async fn pending_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        self.pending_by_deadline(TaskFilter::pending()).await
    }

    /// # Errors
    ///
    /// Returns a storage error from the query.
    pub async fn tasks_by_type(&self, task_type: TaskType) -> Result<Vec<Task>, DatabaseError> {
        self.pending_by_deadline(TaskFilter::pending().with_type(task_type))
            .await
    }

    async fn pending_by_deadline(&self, filter: TaskFilter) -> Result<Vec<Task>, DatabaseError> {
        self.store
            .query(&filter, Some(TaskSort::asc(SortField::Deadline)))
            .await
    }

    async fn refresh_reminders(&self) {
        if let Err(e) = self.reminders.refresh().await {
            warn!(error = %e, "reminder refresh after mutation failed");
        }
    }
}
