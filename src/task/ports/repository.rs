//! Repository ports for tasks, status records, and requests.
//!
//! Each record kind has an active collection and an archive collection.
//! Archiving moves a record from the former to the latter; archived records
//! are only reachable through the `find_archived` lookups.

use crate::task::domain::{Request, RequestId, Task, TaskId, TaskState, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task in the active collection.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateTask`] when the task ID already
    /// exists, active or archived.
    async fn store(&self, task: &Task) -> RepositoryResult<()>;

    /// Persists changes to an active task.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task is not active.
    async fn update(&self, task: &Task) -> RepositoryResult<()>;

    /// Finds an active task by identifier.
    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;

    /// Returns every active task.
    async fn find_all(&self) -> RepositoryResult<Vec<Task>>;

    /// Moves a task from the active to the archive collection.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task is not active.
    async fn archive(&self, id: TaskId) -> RepositoryResult<()>;

    /// Finds an archived task by identifier.
    async fn find_archived(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
}

/// Outcome of [`TaskStatusRepository::get_or_create`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEntry {
    /// The record already existed.
    Existing(TaskStatus),
    /// The record was created by this call.
    Created(TaskStatus),
}

impl StatusEntry {
    /// Returns `true` when the record was created by this call.
    #[must_use]
    pub const fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Returns the status record.
    #[must_use]
    pub fn into_inner(self) -> TaskStatus {
        match self {
            Self::Existing(status) | Self::Created(status) => status,
        }
    }
}

/// Task status persistence contract.
///
/// Saves are versioned: a record may only be written back when its
/// [`TaskStatus::version`] equals the stored revision.
#[async_trait]
pub trait TaskStatusRepository: Send + Sync {
    /// Returns the active status record for a task, creating it in `initial`
    /// state when none exists.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::StatusArchived`] when the task's record
    /// has already been archived; a second record is never created.
    async fn get_or_create(
        &self,
        task_id: TaskId,
        initial: TaskState,
    ) -> RepositoryResult<StatusEntry>;

    /// Writes a status record back and returns its new revision.
    ///
    /// A record with revision `0` that is not stored yet is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::VersionConflict`] when another writer saved
    /// the record since it was read, or [`RepositoryError::StatusNotFound`]
    /// when a previously stored record is no longer active.
    async fn save(&self, status: &TaskStatus) -> RepositoryResult<u64>;

    /// Finds an active status record by task identifier.
    async fn find_by_id(&self, task_id: TaskId) -> RepositoryResult<Option<TaskStatus>>;

    /// Returns every active status record in exactly `state`.
    async fn find_by_state(&self, state: TaskState) -> RepositoryResult<Vec<TaskStatus>>;

    /// Moves a status record from the active to the archive collection.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::StatusNotFound`] when the record is not
    /// active.
    async fn archive(&self, task_id: TaskId) -> RepositoryResult<()>;

    /// Finds an archived status record by task identifier.
    async fn find_archived(&self, task_id: TaskId) -> RepositoryResult<Option<TaskStatus>>;
}

/// Per-state convenience filters over any [`TaskStatusRepository`].
#[async_trait]
pub trait TaskStatusQueries: TaskStatusRepository {
    /// Records in [`TaskState::Unallocated`].
    async fn unallocated(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Unallocated).await
    }

    /// Records in [`TaskState::Allocated`].
    async fn allocated(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Allocated).await
    }

    /// Records in [`TaskState::Planned`].
    async fn planned(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Planned).await
    }

    /// Records in [`TaskState::Scheduled`].
    async fn scheduled(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Scheduled).await
    }

    /// Records in [`TaskState::Dispatched`].
    async fn dispatched(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Dispatched).await
    }

    /// Records in [`TaskState::Ongoing`].
    async fn ongoing(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Ongoing).await
    }

    /// Records in [`TaskState::Completed`].
    async fn completed(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Completed).await
    }

    /// Records in [`TaskState::Aborted`].
    async fn aborted(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Aborted).await
    }

    /// Records in [`TaskState::Failed`].
    async fn failed(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Failed).await
    }

    /// Records in [`TaskState::Canceled`].
    async fn canceled(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Canceled).await
    }

    /// Records in [`TaskState::Preempted`].
    async fn preempted(&self) -> RepositoryResult<Vec<TaskStatus>> {
        self.find_by_state(TaskState::Preempted).await
    }
}

impl<T: TaskStatusRepository + ?Sized> TaskStatusQueries for T {}

/// Request persistence contract.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Stores a request.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateRequest`] when the request ID
    /// already exists.
    async fn store(&self, request: &Request) -> RepositoryResult<()>;

    /// Finds a request by identifier.
    async fn find_by_id(&self, id: RequestId) -> RepositoryResult<Option<Request>>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A request with the same identifier already exists.
    #[error("duplicate request identifier: {0}")]
    DuplicateRequest(RequestId),

    /// The task is not in the active collection.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The status record is not in the active collection.
    #[error("task status not found: {0}")]
    StatusNotFound(TaskId),

    /// The status record has been moved to the archive.
    #[error("task status already archived: {0}")]
    StatusArchived(TaskId),

    /// Another writer saved the status record since it was read.
    #[error("version conflict on task status {task_id}: expected {expected}, found {found}")]
    VersionConflict {
        /// Task whose status record conflicted.
        task_id: TaskId,
        /// Revision the writer read.
        expected: u64,
        /// Revision currently stored.
        found: u64,
    },

    /// The store is unreachable.
    #[error("persistence unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps a store connectivity error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Returns `true` for store connectivity failures.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
