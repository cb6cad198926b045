//! Persistence adapters for the task module.
//!
//! - [`memory`]: thread-safe in-memory repositories with archive collections

pub mod memory;
