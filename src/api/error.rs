//! Errors raised by the API facade and its transports.

use super::MiddlewareKind;
use crate::message::MessageError;
use thiserror::Error;

/// Failure reported by a single transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The factory cannot build this kind of transport.
    #[error("no transport available for {0}")]
    Unsupported(MiddlewareKind),

    /// The transport rejected its settings.
    #[error("{kind} transport rejected its configuration: {reason}")]
    Configuration {
        /// Transport that failed.
        kind: MiddlewareKind,
        /// What was wrong.
        reason: String,
    },

    /// The transport does not know the publish method.
    #[error("{kind} transport has no method '{method}'")]
    UnknownMethod {
        /// Transport that failed.
        kind: MiddlewareKind,
        /// Requested method.
        method: String,
    },

    /// The message could not be handed to the network.
    #[error("{kind} transport failed to deliver: {reason}")]
    Delivery {
        /// Transport that failed.
        kind: MiddlewareKind,
        /// What went wrong.
        reason: String,
    },
}

/// Failures of the API facade as a whole.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No publish route is configured for the message type.
    #[error("no publish method configured for message type '{0}'")]
    NoPublishRoute(String),

    /// A transport could not be built.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message could not be built.
    #[error(transparent)]
    Message(#[from] MessageError),
}
