//! Task lifecycle tracking.
//!
//! Creating tasks from requests, attaching plans and schedules, moving
//! tasks through their lifecycle states, recording per-action progress
//! reported by robots, and archiving tasks that reach a terminal state.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
