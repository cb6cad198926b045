//! Service layer for task creation, status tracking, progress, and archiving.

use crate::task::{
    domain::{
        ActionId, ActionProgressFields, ActionStatus, IntoIdentity, Request, RequestId, RobotId,
        Schedule, Task, TaskDomainError, TaskId, TaskPlan, TaskProgress, TaskState, TaskStatus,
    },
    ports::{RepositoryError, TaskRepository, TaskStatusRepository},
    services::{ArchiveConsistency, ArchivePolicy},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Default number of read-modify-write attempts per status update.
pub const DEFAULT_MAX_UPDATE_ATTEMPTS: u32 = 5;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// No active task has the identifier.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task has no active status record.
    #[error("task status not found: {0}")]
    StatusNotFound(TaskId),

    /// The status record was archived but the task is still active.
    ///
    /// [`TaskLifecycleService::repair_archive`] finishes the archive.
    #[error("status of task {0} is archived while the task is active")]
    StatusArchived(TaskId),

    /// No request has the identifier.
    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    /// Concurrent writers kept invalidating the status record.
    #[error("gave up updating status of task {task_id} after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// Task whose status could not be written.
        task_id: TaskId,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Tunables for status tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerOptions {
    /// States that archive the task on arrival.
    pub archive_policy: ArchivePolicy,
    /// Read-modify-write attempts before giving up on version conflicts.
    pub max_update_attempts: u32,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            archive_policy: ArchivePolicy::default(),
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
        }
    }
}

/// How a status update obtains the record it mutates.
#[derive(Debug, Clone, Copy)]
enum StatusSource {
    /// Create the record in the given state when absent.
    GetOrCreate(TaskState),
    /// The record must already exist.
    Existing,
}

/// Task lifecycle orchestration service.
///
/// Writes follow a log-and-continue policy: when the store is unreachable
/// the failure is logged and the in-memory result is returned, so callers
/// cannot assume a returned value was persisted. Lookups the caller asked
/// for propagate errors.
pub struct TaskLifecycleService<R, S, C>
where
    R: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    statuses: Arc<S>,
    clock: Arc<C>,
    options: TrackerOptions,
}

impl<R, S, C> Clone for TaskLifecycleService<R, S, C>
where
    R: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            statuses: Arc::clone(&self.statuses),
            clock: Arc::clone(&self.clock),
            options: self.options.clone(),
        }
    }
}

impl<R, S, C> TaskLifecycleService<R, S, C>
where
    R: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with default tracker options.
    #[must_use]
    pub fn new(tasks: Arc<R>, statuses: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            statuses,
            clock,
            options: TrackerOptions::default(),
        }
    }

    /// Replaces the tracker options.
    #[must_use]
    pub fn with_options(mut self, options: TrackerOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the tracker options.
    #[must_use]
    pub const fn options(&self) -> &TrackerOptions {
        &self.options
    }

    /// Persists a new task and gives it an `Unallocated` status record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the repository rejects
    /// the task for a reason other than unavailability (for example a
    /// duplicate identifier).
    #[instrument(skip_all, fields(task_id = %task.id()))]
    pub async fn create_task(&self, task: Task) -> TaskLifecycleResult<Task> {
        match self.tasks.store(&task).await {
            Ok(()) => {}
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "could not store task; continuing unpersisted");
            }
            Err(err) => return Err(err.into()),
        }
        self.apply_status(task.id(), TaskState::Unallocated).await?;
        info!("task created");
        Ok(task)
    }

    /// Derives a task from a request and creates it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when derivation fails, or the
    /// errors of [`Self::create_task`].
    #[instrument(skip_all, fields(request_id = %request.id()))]
    pub async fn create_from_request(&self, request: &Request) -> TaskLifecycleResult<Task> {
        let task = Task::from_request(request)?;
        self.create_task(task).await
    }

    /// Sets a task's lifecycle state, archiving it when the policy says so.
    ///
    /// The status record is created on first use. When the new state is an
    /// archiving state, the status record and then the task are moved to
    /// the archive; failures of either move are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier, and [`TaskLifecycleError::StatusArchived`] when its
    /// status record was archived without the task.
    #[instrument(skip_all, fields(task_id = %task_id, state = %state))]
    pub async fn update_status(
        &self,
        task_id: TaskId,
        state: TaskState,
    ) -> TaskLifecycleResult<TaskStatus> {
        self.ensure_task_exists(task_id).await?;
        self.apply_status(task_id, state).await
    }

    /// Flags or clears the delay marker without changing the state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier.
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn set_delayed(&self, task_id: TaskId, delayed: bool) -> TaskLifecycleResult<TaskStatus> {
        self.ensure_task_exists(task_id).await?;
        self.mutate_status(
            task_id,
            StatusSource::GetOrCreate(TaskState::Unallocated),
            |status| {
                status.set_delayed(delayed);
                Ok(())
            },
        )
        .await
    }

    /// Replaces the robots assigned to a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier.
    pub async fn assign_robots(
        &self,
        task_id: TaskId,
        robots: Vec<RobotId>,
    ) -> TaskLifecycleResult<Task> {
        self.mutate_task(task_id, |task| task.assign_robots(robots))
            .await
    }

    /// Attaches `plan` once per robot and moves the task to `Planned`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier.
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn update_plan(
        &self,
        task_id: TaskId,
        robots: &[RobotId],
        plan: &TaskPlan,
    ) -> TaskLifecycleResult<Task> {
        let task = self
            .mutate_task(task_id, |task| task.update_plan(robots, plan))
            .await?;
        self.apply_status(task_id, TaskState::Planned).await?;
        Ok(task)
    }

    /// Sets the scheduled start and finish times.
    ///
    /// The lifecycle state is left to the scheduler's own
    /// [`Self::update_status`] call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier.
    pub async fn update_schedule(
        &self,
        task_id: TaskId,
        schedule: Schedule,
    ) -> TaskLifecycleResult<Task> {
        self.mutate_task(task_id, |task| task.update_schedule(schedule))
            .await
    }

    /// Replaces the task's duration estimate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier.
    pub async fn update_duration(
        &self,
        task_id: TaskId,
        mean: f64,
        variance: f64,
    ) -> TaskLifecycleResult<Task> {
        self.mutate_task(task_id, |task| task.update_duration(mean, variance))
            .await
    }

    /// Replaces the travel-time estimate of a transportation task.
    ///
    /// Tasks without a travel-time estimate are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier.
    pub async fn update_travel_time(
        &self,
        task_id: TaskId,
        mean: f64,
        variance: f64,
    ) -> TaskLifecycleResult<Task> {
        self.mutate_task(task_id, |task| {
            if !task.constraints_mut().update_travel_time(mean, variance) {
                debug!(%task_id, "task has no travel-time estimate to update");
            }
        })
        .await
    }

    /// Records an action progress report.
    ///
    /// The status record is re-read from the store on every attempt. The
    /// progress ledger is built from the task's first plan on the first
    /// report. The save is versioned; when another writer got there first
    /// the whole read-modify-write is retried.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StatusNotFound`] when the task has no
    /// active status record, [`TaskLifecycleError::Domain`] when the action
    /// id is malformed or not in the ledger (the ledger is left untouched),
    /// and [`TaskLifecycleError::RetriesExhausted`] when conflicts persist.
    #[instrument(skip_all, fields(task_id = %task_id, action_status = %action_status))]
    pub async fn update_progress(
        &self,
        task_id: TaskId,
        action: impl IntoIdentity<ActionId> + Send,
        action_status: ActionStatus,
        fields: ActionProgressFields,
    ) -> TaskLifecycleResult<TaskStatus> {
        let action_id = action.into_identity()?;
        let task = self.tasks.find_by_id(task_id).await?;

        self.mutate_status(task_id, StatusSource::Existing, |status| {
            if status.progress().is_none() {
                let plan = task
                    .as_ref()
                    .ok_or(TaskLifecycleError::TaskNotFound(task_id))?
                    .plan();
                status.progress_or_insert_with(|| TaskProgress::initialize(action_id, plan));
            }
            let progress = status
                .progress_mut()
                .ok_or(TaskLifecycleError::StatusNotFound(task_id))?;
            progress.update(action_id, action_status, fields.clone())?;
            Ok(())
        })
        .await
    }

    /// Clears the current action once the whole plan has been executed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StatusNotFound`] when the task has no
    /// active status record.
    pub async fn complete_progress(&self, task_id: TaskId) -> TaskLifecycleResult<TaskStatus> {
        self.mutate_status(task_id, StatusSource::Existing, |status| {
            if let Some(progress) = status.progress_mut() {
                progress.complete();
            }
            Ok(())
        })
        .await
    }

    /// Returns an active task.
    ///
    /// Accepts a [`TaskId`], a UUID, or its string encoding.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier, or [`TaskLifecycleError::Domain`] when the identifier
    /// is malformed.
    pub async fn get_task(
        &self,
        task_id: impl IntoIdentity<TaskId> + Send,
    ) -> TaskLifecycleResult<Task> {
        let task_id = task_id.into_identity()?;
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }

    /// Returns the active status record of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StatusNotFound`] when the task has no
    /// active status record, or [`TaskLifecycleError::Domain`] when the
    /// identifier is malformed.
    pub async fn get_task_status(
        &self,
        task_id: impl IntoIdentity<TaskId> + Send,
    ) -> TaskLifecycleResult<TaskStatus> {
        let task_id = task_id.into_identity()?;
        self.statuses
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::StatusNotFound(task_id))
    }

    /// Resolves the task a status record belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task is not
    /// active.
    pub async fn task_for_status(&self, status: &TaskStatus) -> TaskLifecycleResult<Task> {
        self.get_task(status.task_id()).await
    }

    /// Returns active tasks whose status is exactly `state`.
    ///
    /// Status records whose task is no longer active are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when a lookup fails.
    pub async fn tasks_by_status(&self, state: TaskState) -> TaskLifecycleResult<Vec<Task>> {
        let statuses = self.statuses.find_by_state(state).await?;
        let mut tasks = Vec::with_capacity(statuses.len());
        for status in statuses {
            match self.tasks.find_by_id(status.task_id()).await? {
                Some(task) => tasks.push(task),
                None => warn!(
                    task_id = %status.task_id(),
                    "active status record has no active task"
                ),
            }
        }
        Ok(tasks)
    }

    /// Returns active tasks assigned to `robot`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn tasks_by_robot(&self, robot: &RobotId) -> TaskLifecycleResult<Vec<Task>> {
        let tasks = self.tasks.find_all().await?;
        Ok(tasks
            .into_iter()
            .filter(|task| task.is_assigned_to(robot))
            .collect())
    }

    /// Returns active tasks assigned to `robot`, optionally narrowed to one
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when a lookup fails.
    pub async fn get_tasks(
        &self,
        robot: &RobotId,
        state: Option<TaskState>,
    ) -> TaskLifecycleResult<Vec<Task>> {
        match state {
            Some(state) => Ok(self
                .tasks_by_status(state)
                .await?
                .into_iter()
                .filter(|task| task.is_assigned_to(robot))
                .collect()),
            None => self.tasks_by_robot(robot).await,
        }
    }

    /// Returns `true` once the task's scheduled start time has passed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when no active task has
    /// the identifier.
    pub async fn is_executable(&self, task_id: TaskId) -> TaskLifecycleResult<bool> {
        let task = self.get_task(task_id).await?;
        Ok(task.is_executable(self.clock.utc()))
    }

    /// Reports where a task and its status record currently live.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when a lookup fails.
    pub async fn check_archive_consistency(
        &self,
        task_id: TaskId,
    ) -> TaskLifecycleResult<ArchiveConsistency> {
        let task_active = self.tasks.find_by_id(task_id).await?.is_some();
        let task_archived = self.tasks.find_archived(task_id).await?.is_some();
        let status_active = self.statuses.find_by_id(task_id).await?.is_some();
        let status_archived = self.statuses.find_archived(task_id).await?.is_some();
        Ok(ArchiveConsistency::classify(
            task_active,
            task_archived,
            status_active,
            status_archived,
        ))
    }

    /// Archives whichever record a half-finished archive left behind.
    ///
    /// Returns the classification after the repair.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when a lookup or move
    /// fails.
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn repair_archive(&self, task_id: TaskId) -> TaskLifecycleResult<ArchiveConsistency> {
        match self.check_archive_consistency(task_id).await? {
            ArchiveConsistency::TaskArchivedStatusActive => {
                info!("archiving status record left behind by an interrupted archive");
                self.statuses.archive(task_id).await?;
            }
            ArchiveConsistency::StatusArchivedTaskActive => {
                info!("archiving task left behind by an interrupted archive");
                self.tasks.archive(task_id).await?;
            }
            consistent => return Ok(consistent),
        }
        self.check_archive_consistency(task_id).await
    }

    async fn ensure_task_exists(&self, task_id: TaskId) -> TaskLifecycleResult<()> {
        match self.tasks.find_by_id(task_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(TaskLifecycleError::TaskNotFound(task_id)),
            Err(err) if err.is_unavailable() => {
                warn!(%task_id, error = %err, "could not verify task; continuing");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn apply_status(&self, task_id: TaskId, state: TaskState) -> TaskLifecycleResult<TaskStatus> {
        let status = self
            .mutate_status(task_id, StatusSource::GetOrCreate(state), |status| {
                status.set_status(state);
                Ok(())
            })
            .await?;
        if self.options.archive_policy.archives(state) {
            self.archive_pair(task_id).await;
        }
        Ok(status)
    }

    /// Moves the status record, then the task, to the archive.
    async fn archive_pair(&self, task_id: TaskId) {
        if let Err(err) = self.statuses.archive(task_id).await {
            warn!(%task_id, error = %err, "could not archive task status");
        }
        match self.tasks.archive(task_id).await {
            Ok(()) => info!(%task_id, "task archived"),
            Err(err) => warn!(%task_id, error = %err, "could not archive task"),
        }
    }

    async fn load_status(
        &self,
        task_id: TaskId,
        source: StatusSource,
    ) -> TaskLifecycleResult<TaskStatus> {
        match source {
            StatusSource::GetOrCreate(initial) => {
                match self.statuses.get_or_create(task_id, initial).await {
                    Ok(entry) => {
                        if entry.was_created() {
                            debug!(%task_id, "created task status record");
                        }
                        Ok(entry.into_inner())
                    }
                    Err(err) if err.is_unavailable() => {
                        warn!(%task_id, error = %err, "could not load task status; using a fresh record");
                        Ok(TaskStatus::new(task_id, initial))
                    }
                    Err(RepositoryError::StatusArchived(archived)) => {
                        warn!(%task_id, "status archived while task is active; refusing to recreate it");
                        Err(TaskLifecycleError::StatusArchived(archived))
                    }
                    Err(err) => Err(err.into()),
                }
            }
            StatusSource::Existing => self
                .statuses
                .find_by_id(task_id)
                .await?
                .ok_or(TaskLifecycleError::StatusNotFound(task_id)),
        }
    }

    /// Read-modify-write of a status record with optimistic retries.
    async fn mutate_status<F>(
        &self,
        task_id: TaskId,
        source: StatusSource,
        mut mutate: F,
    ) -> TaskLifecycleResult<TaskStatus>
    where
        F: FnMut(&mut TaskStatus) -> TaskLifecycleResult<()> + Send,
    {
        let attempts = self.options.max_update_attempts.max(1);
        for attempt in 1..=attempts {
            let mut status = self.load_status(task_id, source).await?;
            mutate(&mut status)?;
            match self.statuses.save(&status).await {
                Ok(version) => {
                    status.set_version(version);
                    return Ok(status);
                }
                Err(RepositoryError::VersionConflict {
                    expected, found, ..
                }) => {
                    debug!(%task_id, attempt, expected, found, "status changed underneath; retrying");
                }
                Err(err) if err.is_unavailable() => {
                    warn!(%task_id, error = %err, "could not save task status; continuing unpersisted");
                    return Ok(status);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(TaskLifecycleError::RetriesExhausted { task_id, attempts })
    }

    async fn mutate_task<F>(&self, task_id: TaskId, mutate: F) -> TaskLifecycleResult<Task>
    where
        F: FnOnce(&mut Task) + Send,
    {
        let mut task = self.get_task(task_id).await?;
        mutate(&mut task);
        match self.tasks.update(&task).await {
            Ok(()) => {}
            Err(err) if err.is_unavailable() => {
                warn!(%task_id, error = %err, "could not save task; continuing unpersisted");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(task)
    }
}
