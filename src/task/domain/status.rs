//! Task lifecycle states and the separately stored status record.

use super::{ParseTaskStateError, TaskId, TaskProgress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state.
///
/// Drivers (allocator, scheduler, execution monitor) set states directly;
/// no transition table is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task has been created but no robot is assigned.
    Unallocated,
    /// Robots have been assigned.
    Allocated,
    /// A plan has been attached.
    Planned,
    /// Start and finish times have been fixed.
    Scheduled,
    /// The plan has been sent to the robot.
    Dispatched,
    /// The robot is executing the plan.
    Ongoing,
    /// Execution finished successfully.
    Completed,
    /// Execution failed.
    Failed,
    /// The task was canceled before completion.
    Canceled,
    /// The task was aborted during execution.
    Aborted,
    /// The task was preempted by another task.
    Preempted,
}

impl TaskState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 11] = [
        Self::Unallocated,
        Self::Allocated,
        Self::Planned,
        Self::Scheduled,
        Self::Dispatched,
        Self::Ongoing,
        Self::Completed,
        Self::Failed,
        Self::Canceled,
        Self::Aborted,
        Self::Preempted,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unallocated => "unallocated",
            Self::Allocated => "allocated",
            Self::Planned => "planned",
            Self::Scheduled => "scheduled",
            Self::Dispatched => "dispatched",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Aborted => "aborted",
            Self::Preempted => "preempted",
        }
    }

    /// Exact-match predicate used by status filters.
    #[must_use]
    pub fn matches(self, status: &TaskStatus) -> bool {
        status.status() == self
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseTaskStateError(value.to_owned()))
    }
}

/// Mutable lifecycle record of a task, stored apart from the task body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    task_id: TaskId,
    status: TaskState,
    #[serde(default)]
    delayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    progress: Option<TaskProgress>,
    #[serde(default)]
    version: u64,
}

impl TaskStatus {
    /// Creates a status record in the given state, with no progress yet.
    #[must_use]
    pub const fn new(task_id: TaskId, status: TaskState) -> Self {
        Self {
            task_id,
            status,
            delayed: false,
            progress: None,
            version: 0,
        }
    }

    /// Returns the identifier of the task this record belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> TaskState {
        self.status
    }

    /// Sets the lifecycle state.
    pub const fn set_status(&mut self, status: TaskState) {
        self.status = status;
    }

    /// Returns `true` when the task's constraints are at risk.
    #[must_use]
    pub const fn delayed(&self) -> bool {
        self.delayed
    }

    /// Flags or clears the delay marker without touching the state.
    pub const fn set_delayed(&mut self, delayed: bool) {
        self.delayed = delayed;
    }

    /// Returns the progress ledger, once execution reporting has begun.
    #[must_use]
    pub const fn progress(&self) -> Option<&TaskProgress> {
        self.progress.as_ref()
    }

    /// Returns the progress ledger mutably.
    pub const fn progress_mut(&mut self) -> Option<&mut TaskProgress> {
        self.progress.as_mut()
    }

    /// Returns the ledger, inserting the one built by `init` when absent.
    pub fn progress_or_insert_with(&mut self, init: impl FnOnce() -> TaskProgress) -> &mut TaskProgress {
        self.progress.get_or_insert_with(init)
    }

    /// Returns the persisted revision this record was read at.
    ///
    /// Repositories compare it on save and bump it after a successful write.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Sets the revision; called by repositories only.
    pub const fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
