//! Repository modules implementing store operations.
//!
//! Each module adds methods to `TaskDb` via `impl TaskDb` blocks.

pub mod task;
