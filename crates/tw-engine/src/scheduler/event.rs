//! Notification payload emitted by the reminder scheduler.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tw_core::entities::Task;

/// A task whose reminder time has been reached while it is still Pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEvent {
    /// The task as it was in the scheduler snapshot.
    pub task: Task,
    /// Scan time that matched the reminder.
    pub fired_at: NaiveDateTime,
}

impl ReminderEvent {
    #[must_use]
    pub const fn task_id(&self) -> Option<i64> {
        self.task.id()
    }
}
