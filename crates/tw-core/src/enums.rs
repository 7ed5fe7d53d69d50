//! Priority, category, and lifecycle state enums for taskwatch.
//!
//! Every enum serializes to the exact text stored in the `tasks` table
//! (`"High"`, `"Work"`, `"Pending"`, ...). Parsing any other text fails with
//! `CoreError::Validation`, so an out-of-set value can never be held in memory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// How urgent a task is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Sort rank: lower is more urgent.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown priority '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// TaskType
// ---------------------------------------------------------------------------

/// Category a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskType {
    #[default]
    Work,
    Study,
    Life,
    Health,
    Socializing,
    Entertainment,
}

impl TaskType {
    pub const ALL: [Self; 6] = [
        Self::Work,
        Self::Study,
        Self::Life,
        Self::Health,
        Self::Socializing,
        Self::Entertainment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Study => "Study",
            Self::Life => "Life",
            Self::Health => "Health",
            Self::Socializing => "Socializing",
            Self::Entertainment => "Entertainment",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown task type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// TaskState
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
///
/// ```text
/// pending → overdue   (store sweep)
///         → finished  (mark complete)
/// overdue → finished  (mark complete)
/// ```
///
/// Only pending tasks are eligible for reminders and for the overdue sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    Pending,
    Overdue,
    Finished,
}

impl TaskState {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Overdue, Self::Finished];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Overdue, Self::Finished],
            Self::Overdue => &[Self::Finished],
            Self::Finished => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Overdue => "Overdue",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown task state '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_text_parses_back() {
        for p in Priority::ALL {
            assert_eq!(p.as_str().parse::<Priority>().unwrap(), p);
        }
        for t in TaskType::ALL {
            assert_eq!(t.as_str().parse::<TaskType>().unwrap(), t);
        }
        for s in TaskState::ALL {
            assert_eq!(s.as_str().parse::<TaskState>().unwrap(), s);
        }
    }

    #[test]
    fn unknown_values_are_validation_errors() {
        assert!(matches!(
            "Urgent".parse::<Priority>(),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            "work".parse::<TaskType>(),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            "Done".parse::<TaskState>(),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn serde_matches_stored_text() {
        let json = serde_json::to_string(&TaskType::Socializing).unwrap();
        assert_eq!(json, "\"Socializing\"");
        let state: TaskState = serde_json::from_str("\"Overdue\"").unwrap();
        assert_eq!(state, TaskState::Overdue);
    }

    #[test]
    fn state_transitions() {
        assert!(TaskState::Pending.can_transition_to(TaskState::Overdue));
        assert!(TaskState::Pending.can_transition_to(TaskState::Finished));
        assert!(TaskState::Overdue.can_transition_to(TaskState::Finished));
        assert!(!TaskState::Overdue.can_transition_to(TaskState::Pending));
        assert!(!TaskState::Finished.can_transition_to(TaskState::Pending));
        assert!(TaskState::Finished.allowed_next_states().is_empty());
    }

    #[test]
    fn priority_rank_orders_by_urgency() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }
}
