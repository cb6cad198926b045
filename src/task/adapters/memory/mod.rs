//! In-memory adapter implementations.
//!
//! These adapters keep active and archived records in separate maps behind
//! an `RwLock` and can be switched offline to exercise degraded-store paths
//! without a database.

mod collection;
mod request;
mod status;
mod task;

pub use request::InMemoryRequestRepository;
pub use status::InMemoryTaskStatusRepository;
pub use task::InMemoryTaskRepository;
