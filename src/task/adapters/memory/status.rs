//! In-memory task status repository with versioned saves.

use async_trait::async_trait;

use super::collection::SharedCollections;
use crate::task::{
    domain::{TaskId, TaskState, TaskStatus},
    ports::{RepositoryError, RepositoryResult, StatusEntry, TaskStatusRepository},
};

/// Thread-safe in-memory status repository.
///
/// Every successful save bumps the stored revision, so a writer holding a
/// stale copy gets [`RepositoryError::VersionConflict`] instead of silently
/// overwriting a concurrent update.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStatusRepository {
    collections: SharedCollections<TaskId, TaskStatus>,
}

impl InMemoryTaskStatusRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing or regaining the store connection.
    pub fn set_online(&self, online: bool) {
        self.collections.set_online(online);
    }
}

#[async_trait]
impl TaskStatusRepository for InMemoryTaskStatusRepository {
    async fn get_or_create(
        &self,
        task_id: TaskId,
        initial: TaskState,
    ) -> RepositoryResult<StatusEntry> {
        let mut state = self.collections.write()?;
        if let Some(existing) = state.active.get(&task_id) {
            return Ok(StatusEntry::Existing(existing.clone()));
        }
        if state.archive.contains_key(&task_id) {
            return Err(RepositoryError::StatusArchived(task_id));
        }
        let mut created = TaskStatus::new(task_id, initial);
        created.set_version(1);
        state.active.insert(task_id, created.clone());
        Ok(StatusEntry::Created(created))
    }

    async fn save(&self, status: &TaskStatus) -> RepositoryResult<u64> {
        let mut state = self.collections.write()?;
        let task_id = status.task_id();
        let stored_version = match state.active.get(&task_id) {
            Some(stored) => stored.version(),
            None if status.version() == 0 && !state.archive.contains_key(&task_id) => 0,
            None => return Err(RepositoryError::StatusNotFound(task_id)),
        };
        if stored_version != status.version() {
            return Err(RepositoryError::VersionConflict {
                task_id,
                expected: status.version(),
                found: stored_version,
            });
        }

        let next_version = stored_version + 1;
        let mut record = status.clone();
        record.set_version(next_version);
        state.active.insert(task_id, record);
        Ok(next_version)
    }

    async fn find_by_id(&self, task_id: TaskId) -> RepositoryResult<Option<TaskStatus>> {
        let state = self.collections.read()?;
        Ok(state.active.get(&task_id).cloned())
    }

    async fn find_by_state(&self, task_state: TaskState) -> RepositoryResult<Vec<TaskStatus>> {
        let state = self.collections.read()?;
        Ok(state
            .active
            .values()
            .filter(|status| task_state.matches(status))
            .cloned()
            .collect())
    }

    async fn archive(&self, task_id: TaskId) -> RepositoryResult<()> {
        let mut state = self.collections.write()?;
        if state.move_to_archive(task_id) {
            Ok(())
        } else {
            Err(RepositoryError::StatusNotFound(task_id))
        }
    }

    async fn find_archived(&self, task_id: TaskId) -> RepositoryResult<Option<TaskStatus>> {
        let state = self.collections.read()?;
        Ok(state.archive.get(&task_id).cloned())
    }
}
