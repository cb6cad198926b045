//! Tests for applying inbound messages to the task services.

use std::sync::Arc;

use crate::api::{IngestError, IngestOutcome, Ingestor};
use crate::message::MessageError;
use crate::task::{
    adapters::memory::{
        InMemoryRequestRepository, InMemoryTaskRepository, InMemoryTaskStatusRepository,
    },
    domain::{Action, ActionStatus, RequestId, RobotId, Task, TaskPlan, TaskState},
    ports::RequestRepository,
    services::{RequestService, TaskLifecycleError, TaskLifecycleService},
};
use eyre::{OptionExt, Result, bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

type TestLifecycle =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryTaskStatusRepository, DefaultClock>;
type TestIngestor = Ingestor<
    InMemoryTaskRepository,
    InMemoryTaskStatusRepository,
    DefaultClock,
    InMemoryRequestRepository,
>;

#[fixture]
fn lifecycle() -> TestLifecycle {
    TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(InMemoryTaskStatusRepository::new()),
        Arc::new(DefaultClock),
    )
}

fn ingestor(lifecycle: &TestLifecycle) -> TestIngestor {
    ingestor_with(lifecycle, Arc::new(InMemoryRequestRepository::new()))
}

fn ingestor_with(
    lifecycle: &TestLifecycle,
    requests: Arc<InMemoryRequestRepository>,
) -> TestIngestor {
    Ingestor::new(lifecycle.clone(), RequestService::new(requests))
}

fn request_message(request_id: &str) -> Value {
    windowed_request_message(request_id, "2024-01-01T10:00:00", "2024-01-01T10:15:00")
}

fn windowed_request_message(request_id: &str, earliest: &str, latest: &str) -> Value {
    json!({
        "header": {"type": "TASK-REQUEST", "msgId": "5a1c5bd3-3dbf-4c47-9e9a-4ff0b1e7a1d2",
                   "timestamp": "2024-01-01T09:00:00Z"},
        "payload": {
            "requestId": request_id,
            "pickupLocation": "AMK_D_L-1_C39",
            "deliveryLocation": "AMK_D_L-1_C41",
            "earliestPickupTime": earliest,
            "latestPickupTime": latest,
        },
    })
}

fn progress_message(task: &Task, action: &Action, status: &str) -> Value {
    json!({
        "header": {"type": "TASK-PROGRESS", "msgId": "0b9d7a52-5f5e-4d0e-a1cf-8f7b0d2c3e41",
                   "timestamp": "2024-01-01T10:03:00Z"},
        "payload": {
            "taskId": task.id().to_string(),
            "actionId": action.id().to_string(),
            "robotId": "ropod_001",
            "status": status,
        },
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn request_message_creates_unallocated_task(lifecycle: TestLifecycle) -> Result<()> {
    let ingestor = ingestor(&lifecycle);

    let summary = ingestor
        .ingest_batch(vec![request_message("0d5cf7c3-7c1b-4bcb-9c34-0c3bd0e0b7f2")])
        .await;

    let Some(IngestOutcome::TaskCreated(task)) = summary.applied.first() else {
        bail!("expected a created task, got {summary:?}");
    };
    ensure!(task.constraints().pickup().is_some());
    let status = lifecycle.get_task_status(task.id()).await?;
    ensure!(status.status() == TaskState::Unallocated);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_request_is_reported_as_failed(lifecycle: TestLifecycle) -> Result<()> {
    let ingestor = ingestor(&lifecycle);
    let request = request_message("0d5cf7c3-7c1b-4bcb-9c34-0c3bd0e0b7f2");

    let summary = ingestor
        .ingest_batch(vec![request.clone(), request])
        .await;

    ensure!(summary.applied.len() == 1);
    ensure!(matches!(
        summary.failed.as_slice(),
        [IngestError::Lifecycle(TaskLifecycleError::Repository(_))]
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn progress_messages_update_ledger(lifecycle: TestLifecycle) -> Result<()> {
    let ingestor = ingestor(&lifecycle);
    let created = ingestor
        .ingest_batch(vec![request_message("0d5cf7c3-7c1b-4bcb-9c34-0c3bd0e0b7f2")])
        .await;
    let Some(IngestOutcome::TaskCreated(requested)) = created.applied.first() else {
        bail!("expected a created task");
    };
    let robot = RobotId::new("ropod_001")?;
    let plan = TaskPlan::new(
        robot.clone(),
        vec![Action::go_to(["AMK_D_L-1_C39"]), Action::go_to(["AMK_D_L-1_C41"])],
    );
    let task = lifecycle.update_plan(requested.id(), &[robot], &plan).await?;
    let actions = task
        .plan()
        .first()
        .map(TaskPlan::actions)
        .ok_or_eyre("plan attached")?;
    let [first, second] = actions else {
        bail!("expected two actions");
    };

    let summary = ingestor
        .ingest_batch(vec![
            progress_message(&task, first, "completed"),
            progress_message(&task, second, "ongoing"),
        ])
        .await;

    ensure!(summary.applied.len() == 2 && summary.failed.is_empty());
    let status = lifecycle.get_task_status(task.id()).await?;
    let progress = status.progress().ok_or_eyre("ledger initialised")?;
    ensure!(progress.current_action() == Some(second.id()));
    ensure!(progress.get_action(first.id())?.status() == ActionStatus::Completed);
    ensure!(progress.get_action(second.id())?.status() == ActionStatus::Ongoing);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undecodable_records_are_rejected_without_blocking(
    lifecycle: TestLifecycle,
) -> Result<()> {
    let ingestor = ingestor(&lifecycle);

    let summary = ingestor
        .ingest_batch(vec![
            json!({"payload": {}}),
            request_message("not-a-uuid"),
            request_message("0d5cf7c3-7c1b-4bcb-9c34-0c3bd0e0b7f2"),
        ])
        .await;

    ensure!(summary.applied.len() == 1);
    let errors: Vec<&MessageError> = summary.rejected.iter().map(|record| &record.error).collect();
    ensure!(matches!(
        errors.as_slice(),
        [MessageError::MissingHeader, MessageError::MalformedIdentity { .. }]
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inverted_pickup_window_is_rejected_before_registration(
    lifecycle: TestLifecycle,
) -> Result<()> {
    let requests = Arc::new(InMemoryRequestRepository::new());
    let ingestor = ingestor_with(&lifecycle, Arc::clone(&requests));
    let request_id = "0d5cf7c3-7c1b-4bcb-9c34-0c3bd0e0b7f2";

    let summary = ingestor
        .ingest_batch(vec![windowed_request_message(
            request_id,
            "2024-01-01T11:00:00",
            "2024-01-01T10:15:00",
        )])
        .await;

    ensure!(summary.applied.is_empty() && summary.failed.is_empty());
    let Some(record) = summary.rejected.first() else {
        bail!("expected a rejected record, got {summary:?}");
    };
    ensure!(matches!(record.error, MessageError::InvalidField { .. }));
    ensure!(requests.find_by_id(RequestId::parse(request_id)?).await?.is_none());
    Ok(())
}
