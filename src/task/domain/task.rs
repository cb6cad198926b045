//! Task aggregate root and request-to-task derivation.

use super::{
    InterTimepointConstraint, Request, RequestId, RequestKind, RobotId, TaskConstraints,
    TaskDomainError, TaskId, TaskPlan, TimepointConstraint, Timestamp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Start and finish times fixed by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Time at which execution should start.
    pub start_time: Timestamp,
    /// Time by which execution should finish.
    pub finish_time: Timestamp,
}

/// Task aggregate root.
///
/// The lifecycle status lives in a separate [`super::TaskStatus`] record so
/// that frequent status writes never rewrite the task body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    task_id: TaskId,
    request_id: RequestId,
    #[serde(default)]
    assigned_robots: Vec<RobotId>,
    #[serde(default)]
    plan: Vec<TaskPlan>,
    constraints: TaskConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<InterTimepointConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finish_time: Option<Timestamp>,
}

impl Task {
    /// Creates an unassigned, unplanned task for a request.
    #[must_use]
    pub fn new(request_id: RequestId, constraints: TaskConstraints) -> Self {
        Self::with_id(TaskId::new(), request_id, constraints)
    }

    /// Creates a task with an explicit identifier.
    #[must_use]
    pub const fn with_id(task_id: TaskId, request_id: RequestId, constraints: TaskConstraints) -> Self {
        Self {
            task_id,
            request_id,
            assigned_robots: Vec::new(),
            plan: Vec::new(),
            constraints,
            duration: None,
            start_time: None,
            finish_time: None,
        }
    }

    /// Derives a task from a request.
    ///
    /// The constraints' `hard` flag mirrors the request. Transportation
    /// requests additionally seed the pickup window from the request's
    /// pickup times and start with an uninitialized travel-time estimate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTimeWindow`] when a transportation
    /// request's earliest pickup time lies after its latest pickup time.
    pub fn from_request(request: &Request) -> Result<Self, TaskDomainError> {
        let hard = request.hard_constraints();
        let constraints = match request.kind() {
            RequestKind::Task { .. } => TaskConstraints::new(hard),
            RequestKind::Transportation(payload) => {
                let pickup = TimepointConstraint::new(
                    payload.earliest_pickup_time().clone(),
                    payload.latest_pickup_time().clone(),
                )?;
                TaskConstraints::transportation(hard, pickup)
            }
        };
        Ok(Self::new(request.id(), constraints))
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the originating request identifier.
    ///
    /// Resolving it to a [`Request`] requires a repository lookup.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the assigned robots.
    #[must_use]
    pub fn assigned_robots(&self) -> &[RobotId] {
        &self.assigned_robots
    }

    /// Returns `true` when `robot` is assigned to this task.
    #[must_use]
    pub fn is_assigned_to(&self, robot: &RobotId) -> bool {
        self.assigned_robots.contains(robot)
    }

    /// Returns the per-robot plans.
    #[must_use]
    pub fn plan(&self) -> &[TaskPlan] {
        &self.plan
    }

    /// Returns the constraints.
    #[must_use]
    pub const fn constraints(&self) -> &TaskConstraints {
        &self.constraints
    }

    /// Returns the constraints mutably, for statistical updates.
    pub const fn constraints_mut(&mut self) -> &mut TaskConstraints {
        &mut self.constraints
    }

    /// Returns the task duration estimate, if any.
    #[must_use]
    pub const fn duration(&self) -> Option<&InterTimepointConstraint> {
        self.duration.as_ref()
    }

    /// Returns the scheduled start time.
    #[must_use]
    pub const fn start_time(&self) -> Option<&Timestamp> {
        self.start_time.as_ref()
    }

    /// Returns the scheduled finish time.
    #[must_use]
    pub const fn finish_time(&self) -> Option<&Timestamp> {
        self.finish_time.as_ref()
    }

    /// Returns the earliest pickup time of a transportation task.
    #[must_use]
    pub fn earliest_pickup_time(&self) -> Option<&Timestamp> {
        self.constraints
            .pickup()
            .map(TimepointConstraint::earliest_time)
    }

    /// Returns the meta-model name used in message envelopes.
    #[must_use]
    pub const fn meta_model(&self) -> &'static str {
        "task"
    }

    /// Replaces the assigned robots.
    pub fn assign_robots(&mut self, robots: Vec<RobotId>) {
        self.assigned_robots = robots;
    }

    /// Appends `plan` once per robot, bound to that robot.
    pub fn update_plan(&mut self, robots: &[RobotId], plan: &TaskPlan) {
        self.plan
            .extend(robots.iter().map(|robot| plan.for_robot(robot.clone())));
    }

    /// Sets the scheduled start and finish times.
    pub fn update_schedule(&mut self, schedule: Schedule) {
        self.start_time = Some(schedule.start_time);
        self.finish_time = Some(schedule.finish_time);
    }

    /// Replaces the task duration estimate.
    pub fn update_duration(&mut self, mean: f64, variance: f64) {
        self.duration
            .get_or_insert_with(InterTimepointConstraint::uninitialized)
            .update(mean, variance);
    }

    /// Returns `true` once the scheduled start time has passed.
    ///
    /// Unscheduled tasks are never executable.
    #[must_use]
    pub fn is_executable(&self, now: DateTime<Utc>) -> bool {
        self.start_time
            .as_ref()
            .is_some_and(|start| start.instant() < now)
    }
}

/// Selects the task with the minimal pickup earliest time.
///
/// Tasks without a pickup window are skipped. Ties keep the first task seen;
/// callers should not rely on tie order.
#[must_use]
pub fn earliest_task<'a>(candidates: impl IntoIterator<Item = &'a Task>) -> Option<&'a Task> {
    let mut earliest: Option<(&'a Task, &'a Timestamp)> = None;
    for task in candidates {
        let Some(time) = task.earliest_pickup_time() else {
            continue;
        };
        match earliest {
            Some((_, best)) if best <= time => {}
            _ => earliest = Some((task, time)),
        }
    }
    earliest.map(|(task, _)| task)
}
