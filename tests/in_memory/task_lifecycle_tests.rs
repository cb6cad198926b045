//! In-memory integration tests for the task lifecycle, request to archive.

use crate::in_memory::helpers::{Fleet, action_ids, delivery_plan, fleet, morning_pickup, robot};
use convoy::task::{
    domain::{ActionProgressFields, ActionStatus, Request, RobotId, Schedule, TaskState, Timestamp},
    ports::{TaskRepository, TaskStatusRepository},
    services::{ArchiveConsistency, TaskLifecycleError},
};
use eyre::{OptionExt, Result, ensure};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transportation_task_runs_to_archive(fleet: Fleet, robot: RobotId) -> Result<()> {
    let Fleet {
        service,
        tasks,
        statuses,
    } = fleet;
    let request = Request::transportation(morning_pickup());

    let created = service.create_from_request(&request).await?;
    ensure!(service.get_task_status(created.id()).await?.status() == TaskState::Unallocated);
    let pickup = created.constraints().pickup().ok_or_eyre("pickup window")?;
    ensure!(pickup.earliest_time().as_str() == "2024-01-01T10:00:00");
    ensure!(created.constraints().hard());

    service.assign_robots(created.id(), vec![robot.clone()]).await?;
    service.update_status(created.id(), TaskState::Allocated).await?;
    let task = service
        .update_plan(created.id(), &[robot.clone()], &delivery_plan(&robot))
        .await?;
    ensure!(service.get_task_status(task.id()).await?.status() == TaskState::Planned);

    service
        .update_schedule(
            task.id(),
            Schedule {
                start_time: Timestamp::parse("2024-01-01T10:05:00Z")?,
                finish_time: Timestamp::parse("2024-01-01T10:30:00Z")?,
            },
        )
        .await?;
    service.update_status(task.id(), TaskState::Scheduled).await?;
    service.update_status(task.id(), TaskState::Dispatched).await?;
    service.update_status(task.id(), TaskState::Ongoing).await?;

    for action in action_ids(&task) {
        service
            .update_progress(
                task.id(),
                action,
                ActionStatus::Completed,
                ActionProgressFields::new()
                    .with_finish_time(Timestamp::parse("2024-01-01T10:20:00Z")?),
            )
            .await?;
    }
    let status = service.complete_progress(task.id()).await?;
    let progress = status.progress().ok_or_eyre("ledger")?;
    ensure!(progress.current_action().is_none());
    ensure!(
        progress
            .actions()
            .iter()
            .all(|entry| entry.status() == ActionStatus::Completed)
    );

    service.update_status(task.id(), TaskState::Completed).await?;

    ensure!(matches!(
        service.get_task(task.id()).await,
        Err(TaskLifecycleError::TaskNotFound(_))
    ));
    ensure!(tasks.find_archived(task.id()).await?.is_some());
    let archived = statuses
        .find_archived(task.id())
        .await?
        .ok_or_eyre("archived status")?;
    ensure!(archived.status() == TaskState::Completed);
    ensure!(archived.progress().map(|ledger| ledger.actions().len()) == Some(3));
    ensure!(
        service.check_archive_consistency(task.id()).await? == ArchiveConsistency::Archived
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_task_stays_active_for_rescheduling(fleet: Fleet, robot: RobotId) -> Result<()> {
    let task = fleet
        .service
        .create_from_request(&Request::transportation(morning_pickup()))
        .await?;
    fleet
        .service
        .update_plan(task.id(), &[robot.clone()], &delivery_plan(&robot))
        .await?;

    fleet.service.update_status(task.id(), TaskState::Failed).await?;

    ensure!(fleet.tasks.find_by_id(task.id()).await?.is_some());
    let failed = fleet.service.tasks_by_status(TaskState::Failed).await?;
    ensure!(failed.iter().any(|candidate| candidate.id() == task.id()));

    fleet.service.update_status(task.id(), TaskState::Unallocated).await?;
    ensure!(fleet.service.get_task_status(task.id()).await?.status() == TaskState::Unallocated);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn canceled_task_disappears_from_robot_queries(fleet: Fleet, robot: RobotId) -> Result<()> {
    let task = fleet
        .service
        .create_from_request(&Request::task(true))
        .await?;
    fleet
        .service
        .assign_robots(task.id(), vec![robot.clone()])
        .await?;
    ensure!(fleet.service.get_tasks(&robot, None).await?.len() == 1);

    fleet.service.update_status(task.id(), TaskState::Canceled).await?;

    ensure!(fleet.service.get_tasks(&robot, None).await?.is_empty());
    ensure!(
        fleet
            .service
            .get_tasks(&robot, Some(TaskState::Canceled))
            .await?
            .is_empty()
    );
    Ok(())
}
