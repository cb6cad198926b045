//! Storage and explicit resolution of the requests tasks refer to.

use crate::task::{
    domain::{Request, Task},
    ports::RequestRepository,
    services::{TaskLifecycleError, TaskLifecycleResult},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Keeps inbound requests and resolves a task's request reference.
///
/// Tasks only carry a [`crate::task::domain::RequestId`]; following it is a
/// store round-trip made through this service.
pub struct RequestService<Q>
where
    Q: RequestRepository,
{
    requests: Arc<Q>,
}

impl<Q> Clone for RequestService<Q>
where
    Q: RequestRepository,
{
    fn clone(&self) -> Self {
        Self {
            requests: Arc::clone(&self.requests),
        }
    }
}

impl<Q> RequestService<Q>
where
    Q: RequestRepository,
{
    /// Creates a request service.
    #[must_use]
    pub const fn new(requests: Arc<Q>) -> Self {
        Self { requests }
    }

    /// Stores an inbound request.
    ///
    /// An unavailable store is logged and skipped so that the task can still
    /// be created; the request then resolves as missing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the request is a
    /// duplicate or the store rejects it.
    pub async fn register(&self, request: &Request) -> TaskLifecycleResult<()> {
        match self.requests.store(request).await {
            Ok(()) => {
                debug!(request_id = %request.id(), "request registered");
                Ok(())
            }
            Err(err) if err.is_unavailable() => {
                warn!(request_id = %request.id(), error = %err, "could not store request");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves the request a task was derived from.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::RequestNotFound`] when the request is
    /// unknown.
    pub async fn resolve(&self, task: &Task) -> TaskLifecycleResult<Request> {
        let request_id = task.request_id();
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or(TaskLifecycleError::RequestNotFound(request_id))
    }
}
