//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Conversion of caller-supplied identity values into a canonical identity.
///
/// Robots and transports report identifiers either as typed values or as
/// their string encoding; both normalise to the same identity before any
/// comparison happens.
pub trait IntoIdentity<T> {
    /// Normalises the value into the canonical identity type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedIdentity`] when a string form does
    /// not parse as a UUID.
    fn into_identity(self) -> Result<T, TaskDomainError>;
}

macro_rules! uuid_identity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses an identifier from its string encoding.
            ///
            /// # Errors
            ///
            /// Returns [`TaskDomainError::MalformedIdentity`] when the value
            /// is not a UUID.
            pub fn parse(value: &str) -> Result<Self, TaskDomainError> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| TaskDomainError::MalformedIdentity(value.to_owned()))
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TaskDomainError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value)
            }
        }

        impl IntoIdentity<$name> for $name {
            fn into_identity(self) -> Result<$name, TaskDomainError> {
                Ok(self)
            }
        }

        impl IntoIdentity<$name> for Uuid {
            fn into_identity(self) -> Result<$name, TaskDomainError> {
                Ok($name(self))
            }
        }

        impl IntoIdentity<$name> for &str {
            fn into_identity(self) -> Result<$name, TaskDomainError> {
                $name::parse(self)
            }
        }

        impl IntoIdentity<$name> for &String {
            fn into_identity(self) -> Result<$name, TaskDomainError> {
                $name::parse(self)
            }
        }

        impl IntoIdentity<$name> for String {
            fn into_identity(self) -> Result<$name, TaskDomainError> {
                $name::parse(&self)
            }
        }
    };
}

uuid_identity!(
    /// Unique identifier for an internal task record.
    TaskId
);

uuid_identity!(
    /// Unique identifier for a single plan action.
    ActionId
);

uuid_identity!(
    /// Unique identifier for an external request.
    RequestId
);

/// Identifier of a robot in the fleet, for example `robot_001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RobotId(String);

impl RobotId {
    /// Creates a validated robot identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyRobotId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyRobotId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RobotId {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RobotId> for String {
    fn from(value: RobotId) -> Self {
        value.0
    }
}

impl AsRef<str> for RobotId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user who issued a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyUserId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
