use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::enums::{Priority, TaskState, TaskType};
use crate::errors::CoreError;
use crate::time::{ensure_storable, reminder_time_for, truncate_to_seconds};

/// A personal task with a deadline and a derived reminder time.
///
/// Fields are private. Build new tasks with [`Task::builder`], rebuild stored
/// rows with [`Task::restore`], and mutate through the setters, which
/// re-validate on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    id: Option<i64>,
    title: String,
    description: String,
    deadline: NaiveDateTime,
    priority: Priority,
    task_type: TaskType,
    state: TaskState,
    reminder_time: NaiveDateTime,
}

/// Unvalidated, all-public form of a task, as read from storage or the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub deadline: NaiveDateTime,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub state: TaskState,
    /// `None` falls back to the default offset before `deadline`.
    #[serde(default)]
    pub reminder_time: Option<NaiveDateTime>,
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "title must be a non-empty string".into(),
        ));
    }
    Ok(())
}

impl Task {
    /// Start building a pending, medium-priority work task.
    #[must_use]
    pub fn builder(title: impl Into<String>, deadline: NaiveDateTime) -> TaskBuilder {
        TaskBuilder {
            title: title.into(),
            description: String::new(),
            deadline,
            priority: Priority::default(),
            task_type: TaskType::default(),
            state: TaskState::default(),
            reminder_time: None,
        }
    }

    /// Rebuild a task from its record form, validating every field.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the title is empty or a timestamp
    /// does not fit the storage format.
    pub fn restore(record: TaskRecord) -> Result<Self, CoreError> {
        validate_title(&record.title)?;
        let deadline = ensure_storable(truncate_to_seconds(record.deadline))?;
        let reminder_time = match record.reminder_time {
            Some(explicit) => ensure_storable(truncate_to_seconds(explicit))?,
            None => reminder_time_for(deadline)?,
        };
        Ok(Self {
            id: record.id,
            title: record.title,
            description: record.description,
            deadline,
            priority: record.priority,
            task_type: record.task_type,
            state: record.state,
            reminder_time,
        })
    }

    /// Re-check invariants. Always passes for values built through this API.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the title is empty.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)
    }

    #[must_use]
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            deadline: self.deadline,
            priority: self.priority,
            task_type: self.task_type,
            state: self.state,
            reminder_time: Some(self.reminder_time),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn deadline(&self) -> NaiveDateTime {
        self.deadline
    }

    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    #[must_use]
    pub const fn reminder_time(&self) -> NaiveDateTime {
        self.reminder_time
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == TaskState::Pending
    }

    /// Whether a reminder for this task should fire at `now`.
    #[must_use]
    pub fn is_reminder_due(&self, now: NaiveDateTime) -> bool {
        self.is_pending() && self.reminder_time <= now
    }

    /// Set the store-assigned id. The id never changes once set.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidState` if the task already has an id.
    pub fn assign_id(&mut self, id: i64) -> Result<(), CoreError> {
        if let Some(existing) = self.id {
            return Err(CoreError::InvalidState(format!(
                "task already has id {existing}, cannot reassign to {id}"
            )));
        }
        self.id = Some(id);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `title` is empty; the task is unchanged.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CoreError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Move the deadline. The reminder time is always recomputed, replacing
    /// any explicitly supplied value.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the deadline or its reminder falls
    /// outside years 0001-9999; the task is unchanged.
    pub fn set_deadline(&mut self, deadline: NaiveDateTime) -> Result<(), CoreError> {
        let deadline = truncate_to_seconds(deadline);
        self.reminder_time = reminder_time_for(deadline)?;
        self.deadline = deadline;
        Ok(())
    }

    pub const fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub const fn set_task_type(&mut self, task_type: TaskType) {
        self.task_type = task_type;
    }

    /// Overwrite the state without checking the transition table.
    pub const fn set_state(&mut self, state: TaskState) {
        self.state = state;
    }

    /// Mark the task complete.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the task is already finished.
    pub fn mark_finished(&mut self) -> Result<(), CoreError> {
        if !self.state.can_transition_to(TaskState::Finished) {
            return Err(CoreError::InvalidTransition {
                entity_type: "task".into(),
                id: self.id.map_or_else(|| "(unsaved)".into(), |id| id.to_string()),
                from: self.state.to_string(),
                to: TaskState::Finished.to_string(),
            });
        }
        self.state = TaskState::Finished;
        Ok(())
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = CoreError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Self::restore(record)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            priority: task.priority,
            task_type: task.task_type,
            state: task.state,
            reminder_time: Some(task.reminder_time),
        }
    }
}

/// Builder returned by [`Task::builder`]. Validation happens once, in [`build`](Self::build).
#[derive(Debug, Clone)]
#[must_use]
pub struct TaskBuilder {
    title: String,
    description: String,
    deadline: NaiveDateTime,
    priority: Priority,
    task_type: TaskType,
    state: TaskState,
    reminder_time: Option<NaiveDateTime>,
}

impl TaskBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub const fn task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub const fn state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }

    /// Override the default reminder time (deadline minus the fixed offset).
    pub const fn reminder_time(mut self, reminder_time: NaiveDateTime) -> Self {
        self.reminder_time = Some(reminder_time);
        self
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the title is empty or the deadline
    /// cannot be stored.
    pub fn build(self) -> Result<Task, CoreError> {
        Task::restore(TaskRecord {
            id: None,
            title: self.title,
            description: self.description,
            deadline: self.deadline,
            priority: self.priority,
            task_type: self.task_type,
            state: self.state,
            reminder_time: self.reminder_time,
        })
    }
}
