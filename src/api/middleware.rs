//! Supported middleware kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A middleware the facade can publish through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiddlewareKind {
    /// Zyre peer-to-peer messaging.
    Zyre,
    /// ROS topics.
    Ros,
    /// HTTP endpoints.
    Rest,
}

impl MiddlewareKind {
    /// Every supported kind.
    pub const ALL: [Self; 3] = [Self::Zyre, Self::Ros, Self::Rest];

    /// Returns the configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zyre => "zyre",
            Self::Ros => "ros",
            Self::Rest => "rest",
        }
    }
}

impl fmt::Display for MiddlewareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unsupported middleware name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported middleware: {0}")]
pub struct ParseMiddlewareKindError(pub String);

impl TryFrom<&str> for MiddlewareKind {
    type Error = ParseMiddlewareKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseMiddlewareKindError(value.to_owned()))
    }
}
