//! Archiving policy and archive consistency classification.

use crate::task::domain::TaskState;

/// States whose arrival moves a task and its status record to the archive.
///
/// The default archives [`TaskState::Completed`], [`TaskState::Canceled`]
/// and [`TaskState::Aborted`]. [`TaskState::Failed`] and
/// [`TaskState::Preempted`] stay active so that a driver can still retry or
/// reschedule them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePolicy {
    states: Vec<TaskState>,
}

impl ArchivePolicy {
    /// Creates a policy archiving exactly the given states.
    #[must_use]
    pub fn new(states: impl IntoIterator<Item = TaskState>) -> Self {
        Self {
            states: states.into_iter().collect(),
        }
    }

    /// Returns `true` when reaching `state` archives the task.
    #[must_use]
    pub fn archives(&self, state: TaskState) -> bool {
        self.states.contains(&state)
    }

    /// Returns the archiving states.
    #[must_use]
    pub fn states(&self) -> &[TaskState] {
        &self.states
    }
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self::new([TaskState::Completed, TaskState::Canceled, TaskState::Aborted])
    }
}

/// Where a task and its status record currently live.
///
/// Archiving moves two records in sequence; an interruption in between
/// leaves one of the half-archived variants behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveConsistency {
    /// The task is active; its status is active or not created yet.
    Active,
    /// The task is archived and so is its status, if one was ever created.
    Archived,
    /// The task was archived but its status record is still active.
    TaskArchivedStatusActive,
    /// The status record was archived but the task is still active.
    StatusArchivedTaskActive,
    /// No task with this identifier exists.
    Missing,
}

impl ArchiveConsistency {
    /// Classifies presence flags for the task and status collections.
    #[must_use]
    pub const fn classify(
        task_active: bool,
        task_archived: bool,
        status_active: bool,
        status_archived: bool,
    ) -> Self {
        match (task_active, task_archived) {
            (true, _) if status_archived && !status_active => Self::StatusArchivedTaskActive,
            (true, _) => Self::Active,
            (false, true) if status_active => Self::TaskArchivedStatusActive,
            (false, true) => Self::Archived,
            (false, false) => Self::Missing,
        }
    }

    /// Returns `true` unless the pair is half-archived.
    #[must_use]
    pub const fn is_consistent(self) -> bool {
        !matches!(
            self,
            Self::TaskArchivedStatusActive | Self::StatusArchivedTaskActive
        )
    }
}
