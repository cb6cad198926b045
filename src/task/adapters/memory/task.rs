//! In-memory task repository.

use async_trait::async_trait;

use super::collection::SharedCollections;
use crate::task::{
    domain::{Task, TaskId},
    ports::{RepositoryError, RepositoryResult, TaskRepository},
};

/// Thread-safe in-memory task repository with an archive collection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    collections: SharedCollections<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing or regaining the store connection.
    ///
    /// While offline every operation fails with
    /// [`RepositoryError::Unavailable`].
    pub fn set_online(&self, online: bool) {
        self.collections.set_online(online);
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self.collections.write()?;
        if state.contains(&task.id()) {
            return Err(RepositoryError::DuplicateTask(task.id()));
        }
        state.active.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self.collections.write()?;
        let slot = state
            .active
            .get_mut(&task.id())
            .ok_or(RepositoryError::TaskNotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let state = self.collections.read()?;
        Ok(state.active.get(&id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Task>> {
        let state = self.collections.read()?;
        Ok(state.active.values().cloned().collect())
    }

    async fn archive(&self, id: TaskId) -> RepositoryResult<()> {
        let mut state = self.collections.write()?;
        if state.move_to_archive(id) {
            Ok(())
        } else {
            Err(RepositoryError::TaskNotFound(id))
        }
    }

    async fn find_archived(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let state = self.collections.read()?;
        Ok(state.archive.get(&id).cloned())
    }
}
