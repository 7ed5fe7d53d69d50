//! # tw-core
//!
//! Core types and error types for taskwatch.
//!
//! This crate provides the foundational types shared across all taskwatch crates:
//! - The `Task` entity with validated construction and mutation
//! - Priority, category, and lifecycle state enums with state machine transitions
//! - The `Clock` abstraction used by the store sweep and the reminder scan
//! - Timestamp format and reminder offset constants
//! - Cross-cutting error types

pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod time;
