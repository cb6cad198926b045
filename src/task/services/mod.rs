//! Application services for task lifecycle orchestration.

mod archive;
mod lifecycle;
mod requests;

pub use archive::{ArchiveConsistency, ArchivePolicy};
pub use lifecycle::{
    DEFAULT_MAX_UPDATE_ATTEMPTS, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    TrackerOptions,
};
pub use requests::RequestService;
