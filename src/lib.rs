//! Convoy: task lifecycle tracking for a robot fleet.
//!
//! Requests arrive from users or upstream systems; each one becomes a task
//! with temporal constraints, a plan of actions per robot, and a status
//! record holding the lifecycle state and a per-action progress ledger.
//! Terminal tasks move to an archive.
//!
//! # Architecture
//!
//! The task core follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory implementations of the ports
//! - **Services**: Lifecycle orchestration over the ports
//!
//! # Modules
//!
//! - [`task`]: Task model, status tracking, and archiving
//! - [`message`]: camelCase wire envelopes and inbound decoding
//! - [`api`]: Middleware facade and inbound ingestion
//! - [`config`]: Layered settings
//! - [`telemetry`]: Tracing subscriber setup

pub mod api;
pub mod config;
pub mod message;
pub mod task;
pub mod telemetry;
