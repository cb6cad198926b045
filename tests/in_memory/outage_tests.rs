//! Store outages during status writes.

use std::sync::Arc;

use crate::in_memory::helpers::{Fleet, fleet, morning_pickup};
use convoy::task::{
    adapters::memory::InMemoryRequestRepository,
    domain::{Request, TaskState},
    ports::{RequestRepository, TaskRepository},
    services::{ArchiveConsistency, RequestService, TaskLifecycleError},
};
use eyre::{Result, ensure};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_write_survives_status_store_outage(fleet: Fleet) -> Result<()> {
    let task = fleet
        .service
        .create_from_request(&Request::transportation(morning_pickup()))
        .await?;

    fleet.statuses.set_online(false);
    let status = fleet
        .service
        .update_status(task.id(), TaskState::Allocated)
        .await?;
    ensure!(status.status() == TaskState::Allocated);

    fleet.statuses.set_online(true);
    let stored = fleet.service.get_task_status(task.id()).await?;
    ensure!(stored.status() == TaskState::Unallocated, "outage write is not persisted");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_store_outage_leaves_archive_half_done(fleet: Fleet) -> Result<()> {
    let task = fleet
        .service
        .create_from_request(&Request::task(true))
        .await?;

    fleet.tasks.set_online(false);
    let status = fleet
        .service
        .update_status(task.id(), TaskState::Canceled)
        .await?;
    ensure!(status.status() == TaskState::Canceled);
    fleet.tasks.set_online(true);

    ensure!(fleet.tasks.find_by_id(task.id()).await?.is_some());
    ensure!(
        fleet.service.check_archive_consistency(task.id()).await?
            == ArchiveConsistency::StatusArchivedTaskActive
    );

    let repaired = fleet.service.repair_archive(task.id()).await?;
    ensure!(repaired == ArchiveConsistency::Archived);
    ensure!(matches!(
        fleet.service.get_task(task.id()).await,
        Err(TaskLifecycleError::TaskNotFound(_))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_is_created_while_request_store_is_offline(fleet: Fleet) -> Result<()> {
    let store = Arc::new(InMemoryRequestRepository::new());
    let requests = RequestService::new(Arc::clone(&store));
    let request = Request::transportation(morning_pickup());

    store.set_online(false);
    requests.register(&request).await?;
    let task = fleet.service.create_from_request(&request).await?;
    store.set_online(true);

    ensure!(task.request_id() == request.id());
    ensure!(store.find_by_id(request.id()).await?.is_none(), "outage write is not persisted");
    ensure!(matches!(
        requests.resolve(&task).await,
        Err(TaskLifecycleError::RequestNotFound(id)) if id == request.id()
    ));
    Ok(())
}
