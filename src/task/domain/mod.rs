//! Domain model for fleet task lifecycle management.
//!
//! The task domain models requests, tasks and their constraints, robot
//! plans, lifecycle status records, and per-action progress ledgers while
//! keeping all infrastructure concerns outside of the domain boundary.

mod action;
mod constraints;
mod error;
mod ids;
mod progress;
mod request;
mod status;
mod task;
mod timestamp;

pub use action::{Action, ActionKind, TaskPlan};
pub use constraints::{
    InterTimepointConstraint, TaskConstraints, TemporalConstraints, TimepointConstraint,
};
pub use error::{
    ParseActionStatusError, ParseTaskPriorityError, ParseTaskStateError, TaskDomainError,
};
pub use ids::{ActionId, IntoIdentity, RequestId, RobotId, TaskId, UserId};
pub use progress::{ActionProgress, ActionProgressFields, ActionStatus, TaskProgress};
pub use request::{Request, RequestKind, TaskPriority, TransportationRequest};
pub use status::{TaskState, TaskStatus};
pub use task::{Schedule, Task, earliest_task};
pub use timestamp::{TimeResolution, Timestamp};
