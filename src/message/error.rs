//! Errors raised while encoding or decoding messages.

use thiserror::Error;

/// Failures at the message boundary.
///
/// Decoding failures describe a single record; batch decoding collects them
/// per record instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The message has no `header` object.
    #[error("message has no header")]
    MissingHeader,

    /// The header names a type this boundary does not decode.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// A field is missing or has the wrong shape.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Snake_case name of the offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An identifier field is not a valid UUID.
    #[error("malformed identity in field '{field}': {value}")]
    MalformedIdentity {
        /// Snake_case name of the offending field.
        field: String,
        /// The rejected text.
        value: String,
    },

    /// A model could not be converted to or from JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl MessageError {
    pub(crate) fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MessageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for message boundary operations.
pub type MessageResult<T> = Result<T, MessageError>;
