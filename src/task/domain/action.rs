//! Plan actions and per-robot task plans.

use super::{ActionId, InterTimepointConstraint, RobotId};
use serde::{Deserialize, Serialize};

/// Kind-specific description of what an action does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionKind {
    /// Navigate through the given locations, in order.
    #[serde(rename = "GOTO")]
    GoTo {
        /// Waypoints to visit.
        locations: Vec<String>,
    },
    /// An action kind that carries no extra fields, such as docking.
    #[serde(rename = "OTHER")]
    Other {
        /// Name of the action kind as reported by the planner.
        name: String,
    },
}

impl ActionKind {
    /// Returns the action type label.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::GoTo { .. } => "GOTO",
            Self::Other { name } => name,
        }
    }
}

/// One atomic step of a robot's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    action_id: ActionId,
    #[serde(flatten)]
    kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estimated_duration: Option<InterTimepointConstraint>,
}

impl Action {
    /// Creates an action with a fresh identifier.
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self::with_id(ActionId::new(), kind)
    }

    /// Creates an action with an explicit identifier.
    #[must_use]
    pub const fn with_id(action_id: ActionId, kind: ActionKind) -> Self {
        Self {
            action_id,
            kind,
            estimated_duration: None,
        }
    }

    /// Creates a navigation action over the given locations.
    #[must_use]
    pub fn go_to(locations: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(ActionKind::GoTo {
            locations: locations.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns the action identifier.
    #[must_use]
    pub const fn id(&self) -> ActionId {
        self.action_id
    }

    /// Returns the action kind.
    #[must_use]
    pub const fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Returns the duration estimate, if any.
    #[must_use]
    pub const fn estimated_duration(&self) -> Option<&InterTimepointConstraint> {
        self.estimated_duration.as_ref()
    }

    /// Replaces the duration estimate, creating it when absent.
    pub fn update_duration(&mut self, mean: f64, variance: f64) {
        self.estimated_duration
            .get_or_insert_with(InterTimepointConstraint::uninitialized)
            .update(mean, variance);
    }
}

/// Ordered list of actions one robot executes for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPlan {
    robot: RobotId,
    actions: Vec<Action>,
}

impl TaskPlan {
    /// Creates a plan. Execution order is the order of `actions`.
    #[must_use]
    pub const fn new(robot: RobotId, actions: Vec<Action>) -> Self {
        Self { robot, actions }
    }

    /// Returns the robot executing this plan.
    #[must_use]
    pub const fn robot(&self) -> &RobotId {
        &self.robot
    }

    /// Returns the actions in execution order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the first action, if the plan is not empty.
    #[must_use]
    pub fn first_action(&self) -> Option<&Action> {
        self.actions.first()
    }

    /// Returns a copy of this plan bound to another robot.
    #[must_use]
    pub fn for_robot(&self, robot: RobotId) -> Self {
        Self {
            robot,
            actions: self.actions.clone(),
        }
    }
}
