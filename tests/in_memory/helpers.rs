//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use convoy::task::{
    adapters::memory::{InMemoryTaskRepository, InMemoryTaskStatusRepository},
    domain::{Action, ActionId, RobotId, Task, TaskPlan, Timestamp, TransportationRequest},
    ports::TaskStatusRepository,
    services::TaskLifecycleService,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Lifecycle service over the default in-memory repositories.
pub type MemoryService<S = InMemoryTaskStatusRepository> =
    TaskLifecycleService<InMemoryTaskRepository, S, DefaultClock>;

/// A service plus direct handles on its repositories.
pub struct Fleet<S: TaskStatusRepository = InMemoryTaskStatusRepository> {
    /// The service under test.
    pub service: MemoryService<S>,
    /// Task repository shared with the service.
    pub tasks: Arc<InMemoryTaskRepository>,
    /// Status repository shared with the service.
    pub statuses: Arc<S>,
}

/// Builds a fleet over the given status repository.
pub fn fleet_with<S: TaskStatusRepository>(statuses: S) -> Fleet<S> {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let statuses = Arc::new(statuses);
    let service = TaskLifecycleService::new(
        Arc::clone(&tasks),
        Arc::clone(&statuses),
        Arc::new(DefaultClock),
    );
    Fleet {
        service,
        tasks,
        statuses,
    }
}

/// Provides a fleet over fresh in-memory repositories.
#[fixture]
pub fn fleet() -> Fleet {
    fleet_with(InMemoryTaskStatusRepository::new())
}

/// Provides the robot used throughout the tests.
#[fixture]
pub fn robot() -> RobotId {
    RobotId::new("ropod_001").expect("valid robot id")
}

/// Builds a transportation payload with a 10:00 to 10:15 pickup window.
pub fn morning_pickup() -> TransportationRequest {
    TransportationRequest::new(
        "AMK_D_L-1_C39",
        "AMK_D_L-1_C41",
        Timestamp::parse("2024-01-01T10:00:00").expect("valid timestamp"),
        Timestamp::parse("2024-01-01T10:15:00").expect("valid timestamp"),
    )
    .expect("ordered window")
    .with_load("mobidik", "mobidik_001")
}

/// Builds a three-step navigation plan for `robot`.
pub fn delivery_plan(robot: &RobotId) -> TaskPlan {
    TaskPlan::new(
        robot.clone(),
        vec![
            Action::go_to(["AMK_D_L-1_C39"]),
            Action::go_to(["AMK_D_L-1_C40", "AMK_D_L-1_C41"]),
            Action::go_to(["AMK_D_L-1_C41"]),
        ],
    )
}

/// Returns the action identifiers of the task's first plan.
pub fn action_ids(task: &Task) -> Vec<ActionId> {
    task.plan()
        .first()
        .map(|plan| plan.actions().iter().map(Action::id).collect())
        .unwrap_or_default()
}
