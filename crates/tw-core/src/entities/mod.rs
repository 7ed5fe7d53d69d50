//! Entity structs for taskwatch domain objects.
//!
//! Each entity maps to a table in the libSQL database. Entities keep their
//! fields private and validate on construction, so an invalid value never
//! exists in memory.

mod task;

pub use task::{Task, TaskBuilder, TaskRecord};
