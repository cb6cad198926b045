//! Interleaved progress reports against a shared status record.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::in_memory::helpers::{Fleet, action_ids, delivery_plan, fleet_with, robot};
use async_trait::async_trait;
use convoy::task::{
    adapters::memory::InMemoryTaskStatusRepository,
    domain::{ActionProgressFields, ActionStatus, Request, RobotId, TaskId, TaskState, TaskStatus},
    ports::{RepositoryResult, StatusEntry, TaskStatusRepository},
};
use eyre::{OptionExt, Result, ensure};
use rstest::rstest;
use tokio::sync::Barrier;

/// Status repository whose first two reads wait for each other, so both
/// writers hold the same revision before either saves.
struct LockstepReads {
    inner: InMemoryTaskStatusRepository,
    barrier: Barrier,
    reads: AtomicUsize,
}

impl LockstepReads {
    fn new() -> Self {
        Self {
            inner: InMemoryTaskStatusRepository::new(),
            barrier: Barrier::new(2),
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TaskStatusRepository for LockstepReads {
    async fn get_or_create(
        &self,
        task_id: TaskId,
        initial: TaskState,
    ) -> RepositoryResult<StatusEntry> {
        self.inner.get_or_create(task_id, initial).await
    }

    async fn save(&self, status: &TaskStatus) -> RepositoryResult<u64> {
        self.inner.save(status).await
    }

    async fn find_by_id(&self, task_id: TaskId) -> RepositoryResult<Option<TaskStatus>> {
        let found = self.inner.find_by_id(task_id).await;
        if self.reads.fetch_add(1, Ordering::SeqCst) < 2 {
            self.barrier.wait().await;
        }
        found
    }

    async fn find_by_state(&self, state: TaskState) -> RepositoryResult<Vec<TaskStatus>> {
        self.inner.find_by_state(state).await
    }

    async fn archive(&self, task_id: TaskId) -> RepositoryResult<()> {
        self.inner.archive(task_id).await
    }

    async fn find_archived(&self, task_id: TaskId) -> RepositoryResult<Option<TaskStatus>> {
        self.inner.find_archived(task_id).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn interleaved_reports_keep_both_updates(robot: RobotId) -> Result<()> {
    let Fleet {
        service, statuses, ..
    } = fleet_with(LockstepReads::new());
    let created = service.create_from_request(&Request::task(true)).await?;
    let task = service
        .update_plan(created.id(), &[robot.clone()], &delivery_plan(&robot))
        .await?;
    let actions = action_ids(&task);
    let first = *actions.first().ok_or_eyre("first action")?;
    let second = *actions.get(1).ok_or_eyre("second action")?;

    let (left, right) = tokio::join!(
        service.update_progress(
            task.id(),
            first,
            ActionStatus::Completed,
            ActionProgressFields::new(),
        ),
        service.update_progress(
            task.id(),
            second,
            ActionStatus::Ongoing,
            ActionProgressFields::new(),
        ),
    );
    left?;
    right?;

    ensure!(statuses.reads.load(Ordering::SeqCst) >= 3, "loser should re-read");
    let stored = service.get_task_status(task.id()).await?;
    let progress = stored.progress().ok_or_eyre("ledger")?;
    ensure!(progress.get_action(first)?.status() == ActionStatus::Completed);
    ensure!(progress.get_action(second)?.status() == ActionStatus::Ongoing);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_status_writes_bump_the_version(robot: RobotId) -> Result<()> {
    let Fleet { service, .. } = fleet_with(InMemoryTaskStatusRepository::new());
    let task = service.create_from_request(&Request::task(false)).await?;
    let task_id = task.id();
    let before = service.get_task_status(task_id).await?.version();

    let assigner = service.clone();
    let flagger = service.clone();
    let (assigned, flagged) = tokio::join!(
        async move { assigner.assign_robots(task_id, vec![robot]).await },
        async move { flagger.set_delayed(task_id, true).await },
    );
    assigned?;
    flagged?;
    service.update_status(task_id, TaskState::Allocated).await?;

    let status = service.get_task_status(task_id).await?;
    ensure!(status.delayed());
    ensure!(status.status() == TaskState::Allocated);
    ensure!(status.version() == before + 2);
    Ok(())
}
