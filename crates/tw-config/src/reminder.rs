//! Reminder scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_check_interval_secs() -> u64 {
    60
}

const fn default_channel_capacity() -> usize {
    64
}

/// What the scheduler does with a task that is still due on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenotifyPolicy {
    /// Emit again on every tick until the task leaves Pending or is edited.
    #[default]
    EveryTick,
    /// Emit once per (task, reminder time) pair.
    Once,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReminderConfig {
    /// Seconds between notification scans.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Seconds between self-heal snapshot refreshes. `0` disables them, so
    /// the snapshot only changes when the task service mutates the store.
    #[serde(default)]
    pub resync_interval_secs: u64,

    /// Buffered events per subscriber before the oldest are dropped.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default)]
    pub renotify: RenotifyPolicy,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            resync_interval_secs: 0,
            channel_capacity: default_channel_capacity(),
            renotify: RenotifyPolicy::default(),
        }
    }
}

impl ReminderConfig {
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    #[must_use]
    pub const fn resync_interval(&self) -> Option<Duration> {
        if self.resync_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.resync_interval_secs))
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero check interval or
    /// channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reminder.check_interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reminder.channel_capacity".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
