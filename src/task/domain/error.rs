//! Error types for task domain validation and parsing.

use super::ActionId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// An identifier was neither a canonical UUID nor a parseable string.
    #[error("malformed identity '{0}', expected a UUID")]
    MalformedIdentity(String),

    /// A robot identifier is empty after trimming.
    #[error("robot identifier must not be empty")]
    EmptyRobotId,

    /// A user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// A timestamp string could not be parsed as ISO-8601.
    #[error("invalid timestamp '{0}', expected ISO-8601")]
    InvalidTimestamp(String),

    /// A time window whose earliest bound lies after its latest bound.
    #[error("invalid time window: earliest {earliest} is after latest {latest}")]
    InvalidTimeWindow {
        /// Earliest bound as received.
        earliest: String,
        /// Latest bound as received.
        latest: String,
    },

    /// The action is not part of the progress ledger.
    #[error("action not found in progress ledger: {0}")]
    ActionNotFound(ActionId),
}

/// Error returned while parsing task states from persistence or payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing request priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing action execution states.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown action status: {0}")]
pub struct ParseActionStatusError(pub String);
