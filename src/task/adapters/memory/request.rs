//! In-memory request repository.

use async_trait::async_trait;

use super::collection::SharedCollections;
use crate::task::{
    domain::{Request, RequestId},
    ports::{RepositoryError, RepositoryResult, RequestRepository},
};

/// Thread-safe in-memory request repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRequestRepository {
    collections: SharedCollections<RequestId, Request>,
}

impl InMemoryRequestRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a storage outage or recovery.
    ///
    /// While offline every operation fails with
    /// [`RepositoryError::Unavailable`].
    pub fn set_online(&self, online: bool) {
        self.collections.set_online(online);
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn store(&self, request: &Request) -> RepositoryResult<()> {
        let mut state = self.collections.write()?;
        if state.contains(&request.id()) {
            return Err(RepositoryError::DuplicateRequest(request.id()));
        }
        state.active.insert(request.id(), request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RequestId) -> RepositoryResult<Option<Request>> {
        let state = self.collections.read()?;
        Ok(state.active.get(&id).cloned())
    }
}
