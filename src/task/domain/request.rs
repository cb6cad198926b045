//! External requests from which tasks are derived.

use super::{ParseTaskPriorityError, RequestId, TaskDomainError, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Urgency of a transportation request.
///
/// Serialized by name. Fleet clients that send numeric levels are accepted
/// too, with `0` as the most urgent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "PriorityRepr")]
pub enum TaskPriority {
    /// Serve when nothing else is pending.
    Low,
    /// Default urgency.
    #[default]
    Normal,
    /// Serve before normal requests.
    High,
    /// Serve immediately.
    Emergency,
}

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "emergency" => Ok(Self::Emergency),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

impl TryFrom<u64> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(level: u64) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Emergency),
            1 => Ok(Self::High),
            2 => Ok(Self::Normal),
            3 => Ok(Self::Low),
            _ => Err(ParseTaskPriorityError(level.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Level(u64),
    Name(String),
}

impl TryFrom<PriorityRepr> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(repr: PriorityRepr) -> Result<Self, Self::Error> {
        match repr {
            PriorityRepr::Level(level) => Self::try_from(level),
            PriorityRepr::Name(name) => name.parse(),
        }
    }
}

const fn default_hard_constraints() -> bool {
    true
}

/// Payload of a request to move a load from one location to another.
///
/// Deserialization applies the same pickup window check as
/// [`TransportationRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransportationRequestData")]
pub struct TransportationRequest {
    pickup_location: String,
    delivery_location: String,
    earliest_pickup_time: Timestamp,
    latest_pickup_time: Timestamp,
    #[serde(default)]
    load_type: String,
    #[serde(default)]
    load_id: String,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default = "default_hard_constraints")]
    hard_constraints: bool,
}

#[derive(Deserialize)]
struct TransportationRequestData {
    pickup_location: String,
    delivery_location: String,
    earliest_pickup_time: Timestamp,
    latest_pickup_time: Timestamp,
    #[serde(default)]
    load_type: String,
    #[serde(default)]
    load_id: String,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default = "default_hard_constraints")]
    hard_constraints: bool,
}

impl TryFrom<TransportationRequestData> for TransportationRequest {
    type Error = TaskDomainError;

    fn try_from(data: TransportationRequestData) -> Result<Self, Self::Error> {
        Ok(Self::new(
            data.pickup_location,
            data.delivery_location,
            data.earliest_pickup_time,
            data.latest_pickup_time,
        )?
        .with_load(data.load_type, data.load_id)
        .with_priority(data.priority)
        .with_hard_constraints(data.hard_constraints))
    }
}

impl TransportationRequest {
    /// Creates a transportation payload with hard constraints and normal
    /// priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTimeWindow`] when the earliest
    /// pickup time lies after the latest pickup time.
    pub fn new(
        pickup_location: impl Into<String>,
        delivery_location: impl Into<String>,
        earliest_pickup_time: Timestamp,
        latest_pickup_time: Timestamp,
    ) -> Result<Self, TaskDomainError> {
        if earliest_pickup_time > latest_pickup_time {
            return Err(TaskDomainError::InvalidTimeWindow {
                earliest: earliest_pickup_time.to_string(),
                latest: latest_pickup_time.to_string(),
            });
        }
        Ok(Self {
            pickup_location: pickup_location.into(),
            delivery_location: delivery_location.into(),
            earliest_pickup_time,
            latest_pickup_time,
            load_type: String::new(),
            load_id: String::new(),
            priority: TaskPriority::Normal,
            hard_constraints: true,
        })
    }

    /// Sets the load being transported.
    #[must_use]
    pub fn with_load(mut self, load_type: impl Into<String>, load_id: impl Into<String>) -> Self {
        self.load_type = load_type.into();
        self.load_id = load_id.into();
        self
    }

    /// Sets the request priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether the pickup window is a hard constraint.
    #[must_use]
    pub const fn with_hard_constraints(mut self, hard: bool) -> Self {
        self.hard_constraints = hard;
        self
    }

    /// Returns the pickup location.
    #[must_use]
    pub fn pickup_location(&self) -> &str {
        &self.pickup_location
    }

    /// Returns the delivery location.
    #[must_use]
    pub fn delivery_location(&self) -> &str {
        &self.delivery_location
    }

    /// Returns the earliest pickup time.
    #[must_use]
    pub const fn earliest_pickup_time(&self) -> &Timestamp {
        &self.earliest_pickup_time
    }

    /// Returns the latest pickup time.
    #[must_use]
    pub const fn latest_pickup_time(&self) -> &Timestamp {
        &self.latest_pickup_time
    }

    /// Returns the load type.
    #[must_use]
    pub fn load_type(&self) -> &str {
        &self.load_type
    }

    /// Returns the load identifier.
    #[must_use]
    pub fn load_id(&self) -> &str {
        &self.load_id
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }
}

/// Request-type-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request_type", rename_all = "snake_case")]
pub enum RequestKind {
    /// A request with no domain-specific constraints.
    Task {
        /// Whether derived constraints are hard.
        #[serde(default = "default_hard_constraints")]
        hard_constraints: bool,
    },
    /// A transportation request with a pickup window.
    Transportation(TransportationRequest),
}

/// A user-originated ask from which a task is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    request_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(flatten)]
    kind: RequestKind,
}

impl Request {
    /// Creates a request without domain-specific constraints.
    #[must_use]
    pub fn task(hard_constraints: bool) -> Self {
        Self::with_id(RequestId::new(), RequestKind::Task { hard_constraints })
    }

    /// Creates a transportation request.
    #[must_use]
    pub fn transportation(payload: TransportationRequest) -> Self {
        Self::with_id(RequestId::new(), RequestKind::Transportation(payload))
    }

    /// Creates a request with an explicit identifier.
    #[must_use]
    pub const fn with_id(request_id: RequestId, kind: RequestKind) -> Self {
        Self {
            request_id,
            user_id: None,
            kind,
        }
    }

    /// Sets the owning user.
    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the owning user, if known.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Returns the request payload.
    #[must_use]
    pub const fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Returns the hard/soft constraint flag.
    #[must_use]
    pub const fn hard_constraints(&self) -> bool {
        match &self.kind {
            RequestKind::Task { hard_constraints } => *hard_constraints,
            RequestKind::Transportation(payload) => payload.hard_constraints,
        }
    }

    /// Returns the meta-model name used in message envelopes.
    #[must_use]
    pub const fn meta_model(&self) -> &'static str {
        match self.kind {
            RequestKind::Task { .. } => "task-request",
            RequestKind::Transportation(_) => "transportation-request",
        }
    }
}
