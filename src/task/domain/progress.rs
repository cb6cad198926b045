//! Per-action execution ledger of a task.

use super::{ActionId, IntoIdentity, ParseActionStatusError, TaskDomainError, TaskPlan, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution state of a single action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Not started yet.
    #[default]
    Planned,
    /// Currently executing.
    Ongoing,
    /// Finished successfully.
    Completed,
    /// Finished unsuccessfully.
    Failed,
}

impl ActionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActionStatus {
    type Error = ParseActionStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "planned" => Ok(Self::Planned),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseActionStatusError(value.to_owned())),
        }
    }
}

/// Optional fields carried by a progress update.
///
/// A ledger entry is replaced wholesale on every update, so any field left
/// unset here is reset to `None` in the new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionProgressFields {
    start_time: Option<Timestamp>,
    finish_time: Option<Timestamp>,
}

impl ActionProgressFields {
    /// Creates an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start time.
    #[must_use]
    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Sets the finish time.
    #[must_use]
    pub fn with_finish_time(mut self, finish_time: Timestamp) -> Self {
        self.finish_time = Some(finish_time);
        self
    }
}

/// Execution record of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProgress {
    action_id: ActionId,
    status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finish_time: Option<Timestamp>,
}

impl ActionProgress {
    /// Creates an entry for an action that has not started.
    #[must_use]
    pub const fn planned(action_id: ActionId) -> Self {
        Self {
            action_id,
            status: ActionStatus::Planned,
            start_time: None,
            finish_time: None,
        }
    }

    /// Builds a complete entry from an update.
    #[must_use]
    pub fn from_fields(action_id: ActionId, status: ActionStatus, fields: ActionProgressFields) -> Self {
        Self {
            action_id,
            status,
            start_time: fields.start_time,
            finish_time: fields.finish_time,
        }
    }

    /// Returns the action identifier.
    #[must_use]
    pub const fn action_id(&self) -> ActionId {
        self.action_id
    }

    /// Returns the execution state.
    #[must_use]
    pub const fn status(&self) -> ActionStatus {
        self.status
    }

    /// Returns the start time, if reported.
    #[must_use]
    pub const fn start_time(&self) -> Option<&Timestamp> {
        self.start_time.as_ref()
    }

    /// Returns the finish time, if reported.
    #[must_use]
    pub const fn finish_time(&self) -> Option<&Timestamp> {
        self.finish_time.as_ref()
    }
}

/// Tracks which action is current and the execution state of each action.
///
/// Entries follow the order of the primary (first) task plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    #[serde(default)]
    current_action: Option<ActionId>,
    #[serde(default)]
    actions: Vec<ActionProgress>,
}

impl TaskProgress {
    /// Builds a ledger from the first plan, every entry `planned`.
    ///
    /// `first_action` becomes the current action when it belongs to the plan;
    /// otherwise the plan's first action does. An empty plan (or no plan at
    /// all) yields an empty ledger with no current action.
    #[must_use]
    pub fn initialize(first_action: ActionId, plans: &[TaskPlan]) -> Self {
        let actions: Vec<ActionProgress> = plans
            .first()
            .map(|plan| {
                plan.actions()
                    .iter()
                    .map(|action| ActionProgress::planned(action.id()))
                    .collect()
            })
            .unwrap_or_default();

        let current_action = if actions.iter().any(|entry| entry.action_id == first_action) {
            Some(first_action)
        } else {
            actions.first().map(ActionProgress::action_id)
        };

        Self {
            current_action,
            actions,
        }
    }

    /// Returns the action currently being executed.
    #[must_use]
    pub const fn current_action(&self) -> Option<ActionId> {
        self.current_action
    }

    /// Returns the ledger entries in plan order.
    #[must_use]
    pub fn actions(&self) -> &[ActionProgress] {
        &self.actions
    }

    /// Records a progress report for one action.
    ///
    /// The matching entry is replaced by a new one built from `status` and
    /// `fields`. On `completed` the current action advances to the next
    /// entry; after the last entry it stays where it is until
    /// [`TaskProgress::complete`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedIdentity`] when `action` cannot be
    /// normalised, or [`TaskDomainError::ActionNotFound`] when the action is
    /// not in the ledger. The ledger is unchanged in both cases.
    pub fn update(
        &mut self,
        action: impl IntoIdentity<ActionId>,
        status: ActionStatus,
        fields: ActionProgressFields,
    ) -> Result<(), TaskDomainError> {
        let action_id = action.into_identity()?;
        let index = self
            .action_index(action_id)
            .ok_or(TaskDomainError::ActionNotFound(action_id))?;

        if let Some(entry) = self.actions.get_mut(index) {
            *entry = ActionProgress::from_fields(action_id, status, fields);
        }

        if status == ActionStatus::Completed
            && let Some(next) = self.actions.get(index + 1)
        {
            self.current_action = Some(next.action_id);
        }
        Ok(())
    }

    /// Marks the whole plan as finished by clearing the current action.
    pub const fn complete(&mut self) {
        self.current_action = None;
    }

    /// Returns the ledger entry for an action.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedIdentity`] or
    /// [`TaskDomainError::ActionNotFound`].
    pub fn get_action(
        &self,
        action: impl IntoIdentity<ActionId>,
    ) -> Result<&ActionProgress, TaskDomainError> {
        let action_id = action.into_identity()?;
        self.actions
            .iter()
            .find(|entry| entry.action_id == action_id)
            .ok_or(TaskDomainError::ActionNotFound(action_id))
    }

    /// Returns the ledger position of an action.
    #[must_use]
    pub fn action_index(&self, action_id: ActionId) -> Option<usize> {
        self.actions
            .iter()
            .position(|entry| entry.action_id == action_id)
    }
}
