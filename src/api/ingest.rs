//! Applying decoded inbound messages to the task services.

use crate::message::{InboundMessage, MessageError, RejectedRecord, decode_batch};
use crate::task::{
    domain::{Task, TaskStatus},
    ports::{RequestRepository, TaskRepository, TaskStatusRepository},
    services::{RequestService, TaskLifecycleError, TaskLifecycleService},
};
use mockable::Clock;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// What an inbound message changed.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// A request was stored and a task derived from it.
    TaskCreated(Task),
    /// A progress report was recorded in the task's ledger.
    ProgressRecorded(TaskStatus),
}

/// Why an inbound message had no effect.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The message did not decode.
    #[error(transparent)]
    Message(#[from] MessageError),

    /// The task services rejected it.
    #[error(transparent)]
    Lifecycle(#[from] TaskLifecycleError),
}

/// Tally of a batch ingest.
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Messages that changed tracker state, in input order.
    pub applied: Vec<IngestOutcome>,
    /// Records that did not decode.
    pub rejected: Vec<RejectedRecord>,
    /// Decoded messages the services refused.
    pub failed: Vec<IngestError>,
}

/// Routes inbound requests and progress reports to the task services.
pub struct Ingestor<R, S, C, Q>
where
    R: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
    Q: RequestRepository,
{
    lifecycle: TaskLifecycleService<R, S, C>,
    requests: RequestService<Q>,
}

impl<R, S, C, Q> Ingestor<R, S, C, Q>
where
    R: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
    Q: RequestRepository,
{
    /// Creates an ingestor over the given services.
    #[must_use]
    pub const fn new(lifecycle: TaskLifecycleService<R, S, C>, requests: RequestService<Q>) -> Self {
        Self {
            lifecycle,
            requests,
        }
    }

    /// Applies one decoded message.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Lifecycle`] when the request is a duplicate,
    /// the task cannot be derived, or the progress report names an unknown
    /// task or action.
    pub async fn ingest(&self, message: InboundMessage) -> Result<IngestOutcome, IngestError> {
        match message {
            InboundMessage::TaskRequest(request) => {
                self.requests.register(&request).await?;
                let task = self.lifecycle.create_from_request(&request).await?;
                Ok(IngestOutcome::TaskCreated(task))
            }
            InboundMessage::ActionProgress(report) => {
                let status = self
                    .lifecycle
                    .update_progress(
                        report.task_id(),
                        report.action_id(),
                        report.status(),
                        report.fields(),
                    )
                    .await?;
                Ok(IngestOutcome::ProgressRecorded(status))
            }
        }
    }

    /// Decodes and applies a batch; one bad record never blocks the rest.
    #[instrument(skip_all)]
    pub async fn ingest_batch(&self, messages: Vec<Value>) -> IngestSummary {
        let decoded = decode_batch(messages);
        let mut summary = IngestSummary {
            rejected: decoded.rejected,
            ..IngestSummary::default()
        };
        for message in decoded.accepted {
            match self.ingest(message).await {
                Ok(outcome) => summary.applied.push(outcome),
                Err(err) => {
                    warn!(error = %err, "inbound message had no effect");
                    summary.failed.push(err);
                }
            }
        }
        info!(
            applied = summary.applied.len(),
            rejected = summary.rejected.len(),
            failed = summary.failed.len(),
            "ingested batch"
        );
        summary
    }
}
