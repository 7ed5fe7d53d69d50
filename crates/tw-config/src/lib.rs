//! # tw-config
//!
//! Layered configuration loading for taskwatch using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TASKWATCH_*` prefix, `__` as separator)
//! 2. Project-level `.taskwatch/config.toml`
//! 3. User-level `~/.config/taskwatch/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! `TASKWATCH_STORE__PATH` -> `store.path`,
//! `TASKWATCH_REMINDER__CHECK_INTERVAL_SECS` -> `reminder.check_interval_secs`.
//!
//! # Usage
//!
//! ```no_run
//! use tw_config::TaskwatchConfig;
//!
//! let config = TaskwatchConfig::load_with_dotenv().expect("config");
//! println!("tasks stored in {}", config.store.path);
//! ```

mod error;
mod reminder;
mod store;

pub use error::ConfigError;
pub use reminder::{ReminderConfig, RenotifyPolicy};
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskwatchConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
}

impl TaskwatchConfig {
    /// Load and validate configuration from TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading a `.env` file, if one exists.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".taskwatch/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TASKWATCH_").split("__"))
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.path".into(),
                reason: "must not be empty".into(),
            });
        }
        self.reminder.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("taskwatch").join("config.toml"))
    }

    /// Walk up from `CARGO_MANIFEST_DIR` (at most two levels) looking for a
    /// `.env`, then fall back to the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
