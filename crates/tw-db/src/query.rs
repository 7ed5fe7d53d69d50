//! Filter and sort criteria for task queries.
//!
//! A [`TaskFilter`] is a conjunction: every field that is set must match.
//! An empty filter selects every task.

use chrono::NaiveDate;
use tw_core::enums::{Priority, TaskState, TaskType};
use tw_core::time::DATE_FORMAT;

/// Filter criteria for task queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub state: Option<TaskState>,
    pub task_type: Option<TaskType>,
    pub priority: Option<Priority>,
    pub title: Option<String>,
    /// Calendar date of the deadline.
    pub deadline_on: Option<NaiveDate>,
}

impl TaskFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending() -> Self {
        Self::default().with_state(TaskState::Pending)
    }

    #[must_use]
    pub const fn with_state(mut self, state: TaskState) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub const fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn with_deadline_on(mut self, date: NaiveDate) -> Self {
        self.deadline_on = Some(date);
        self
    }

    /// Render the filter as a `WHERE` clause plus its positional parameters.
    pub(crate) fn to_where_clause(&self) -> (String, Vec<libsql::Value>) {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(state) = self.state {
            params.push(libsql::Value::Text(state.as_str().to_string()));
            conditions.push(format!("state = ?{}", params.len()));
        }
        if let Some(task_type) = self.task_type {
            params.push(libsql::Value::Text(task_type.as_str().to_string()));
            conditions.push(format!("type = ?{}", params.len()));
        }
        if let Some(priority) = self.priority {
            params.push(libsql::Value::Text(priority.as_str().to_string()));
            conditions.push(format!("priority = ?{}", params.len()));
        }
        if let Some(ref title) = self.title {
            params.push(libsql::Value::Text(title.clone()));
            conditions.push(format!("title = ?{}", params.len()));
        }
        if let Some(date) = self.deadline_on {
            params.push(libsql::Value::Text(date.format(DATE_FORMAT).to_string()));
            conditions.push(format!("DATE(deadline) = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (where_clause, params)
    }
}

/// Column a query result is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Deadline,
    ReminderTime,
    /// Ordered by urgency (High first when ascending), not alphabetically.
    Priority,
    TaskType,
    State,
}

impl SortField {
    const fn sql_expr(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Deadline => "deadline",
            // Rows written before nextTime existed fall back to the default offset.
            Self::ReminderTime => "COALESCE(nextTime, datetime(deadline, '-5 minutes'))",
            Self::Priority => {
                "CASE priority WHEN 'High' THEN 0 WHEN 'Medium' THEN 1 ELSE 2 END"
            }
            Self::TaskType => "type",
            Self::State => "state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort order for a task query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl TaskSort {
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    #[must_use]
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }

    /// `ORDER BY` clause; ties always fall back to insertion order.
    pub(crate) fn to_order_clause(sort: Option<Self>) -> String {
        match sort {
            Some(s) if s.field == SortField::Id => format!("ORDER BY id {}", s.order.as_sql()),
            Some(s) => format!("ORDER BY {} {}, id ASC", s.field.sql_expr(), s.order.as_sql()),
            None => "ORDER BY id ASC".to_string(),
        }
    }
}
