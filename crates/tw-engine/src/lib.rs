//! # tw-engine
//!
//! The task lifecycle engine: the [`TaskService`] write path and the
//! [`ReminderScheduler`] that turns due reminder times into events.
//!
//! ```text
//! front end → TaskService → TaskDb (persist + sweep)
//!                  └──────→ ReminderScheduler::refresh (snapshot swap)
//! background loop → ReminderScheduler::tick → broadcast<ReminderEvent> → subscribers
//! ```

pub mod scheduler;
pub mod service;

pub use scheduler::{ReminderEvent, ReminderHandle, ReminderScheduler};
pub use service::TaskService;
