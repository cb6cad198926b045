//! Decoding of inbound messages into model records.
//!
//! Two message families are understood: task requests
//! (`TASK-REQUEST`, `TRANSPORTATION-REQUEST`) and action progress reports
//! (`TASK-PROGRESS`, `ACTION-PROGRESS`). A progress payload is flat:
//!
//! ```json
//! {"taskId": "...", "actionId": "...", "robotId": "ropod_001",
//!  "status": "completed", "startTime": "...", "finishTime": "..."}
//! ```

use super::{MessageError, MessageResult, naming::underscore_keys};
use crate::task::domain::{
    ActionId, ActionProgressFields, ActionStatus, Request, RobotId, TaskId, Timestamp,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// A request from which a task should be derived.
    TaskRequest(Request),
    /// A robot reporting on one action of a task.
    ActionProgress(ActionProgressReport),
}

/// One robot's report about one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionProgressReport {
    task_id: TaskId,
    action_id: ActionId,
    robot_id: Option<RobotId>,
    status: ActionStatus,
    start_time: Option<Timestamp>,
    finish_time: Option<Timestamp>,
}

impl ActionProgressReport {
    /// Creates a report without robot or timing details.
    #[must_use]
    pub const fn new(task_id: TaskId, action_id: ActionId, status: ActionStatus) -> Self {
        Self {
            task_id,
            action_id,
            robot_id: None,
            status,
            start_time: None,
            finish_time: None,
        }
    }

    /// Sets the reporting robot.
    #[must_use]
    pub fn with_robot(mut self, robot_id: RobotId) -> Self {
        self.robot_id = Some(robot_id);
        self
    }

    /// Returns the task the action belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the reported action.
    #[must_use]
    pub const fn action_id(&self) -> ActionId {
        self.action_id
    }

    /// Returns the reporting robot, if named.
    #[must_use]
    pub const fn robot_id(&self) -> Option<&RobotId> {
        self.robot_id.as_ref()
    }

    /// Returns the reported action state.
    #[must_use]
    pub const fn status(&self) -> ActionStatus {
        self.status
    }

    /// Returns the optional ledger fields carried by the report.
    #[must_use]
    pub fn fields(&self) -> ActionProgressFields {
        let mut fields = ActionProgressFields::new();
        if let Some(start) = &self.start_time {
            fields = fields.with_start_time(start.clone());
        }
        if let Some(finish) = &self.finish_time {
            fields = fields.with_finish_time(finish.clone());
        }
        fields
    }
}

/// An inbound record that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position of the record in the batch.
    pub index: usize,
    /// Why it was rejected.
    pub error: MessageError,
}

/// Outcome of decoding a batch of inbound records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    /// Records that decoded, in input order.
    pub accepted: Vec<InboundMessage>,
    /// Records that did not, in input order.
    pub rejected: Vec<RejectedRecord>,
}

/// Decodes one `{header, payload}` message.
///
/// # Errors
///
/// Returns [`MessageError::MissingHeader`] without a header,
/// [`MessageError::UnknownMessageType`] for types outside the two families,
/// [`MessageError::MalformedIdentity`] for identifiers that are not UUIDs,
/// and [`MessageError::InvalidField`] for any other malformed field.
pub fn decode_message(message: Value) -> MessageResult<InboundMessage> {
    let Value::Object(mut envelope) = message else {
        return Err(MessageError::invalid_field("message", "not a JSON object"));
    };
    let header = envelope.remove("header").ok_or(MessageError::MissingHeader)?;
    let message_type = header
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| MessageError::invalid_field("type", "header has no message type"))?
        .to_ascii_uppercase();
    let payload = envelope
        .remove("payload")
        .ok_or_else(|| MessageError::invalid_field("payload", "message has no payload"))?;
    let Value::Object(document) = underscore_keys(payload) else {
        return Err(MessageError::invalid_field("payload", "not a JSON object"));
    };

    debug!(message_type, "decoding inbound message");
    match message_type.as_str() {
        "TASK-REQUEST" | "TRANSPORTATION-REQUEST" => {
            decode_request(document).map(InboundMessage::TaskRequest)
        }
        "TASK-PROGRESS" | "ACTION-PROGRESS" => {
            decode_progress(&document).map(InboundMessage::ActionProgress)
        }
        _ => Err(MessageError::UnknownMessageType(message_type)),
    }
}

/// Decodes every record of a batch, keeping the good ones.
///
/// A bad record is logged and reported in [`DecodedBatch::rejected`]; it
/// never prevents the rest of the batch from decoding.
pub fn decode_batch(messages: impl IntoIterator<Item = Value>) -> DecodedBatch {
    let mut batch = DecodedBatch::default();
    for (index, message) in messages.into_iter().enumerate() {
        match decode_message(message) {
            Ok(decoded) => batch.accepted.push(decoded),
            Err(error) => {
                warn!(index, %error, "rejected inbound record");
                batch.rejected.push(RejectedRecord { index, error });
            }
        }
    }
    batch
}

fn decode_request(mut document: Map<String, Value>) -> MessageResult<Request> {
    uuid_field(&document, "request_id")?;
    if !document.contains_key("request_type") {
        let kind = if document.contains_key("pickup_location") {
            "transportation"
        } else {
            "task"
        };
        document.insert("request_type".to_owned(), Value::String(kind.to_owned()));
    }
    serde_json::from_value(Value::Object(document))
        .map_err(|err| MessageError::invalid_field("payload", err.to_string()))
}

fn decode_progress(document: &Map<String, Value>) -> MessageResult<ActionProgressReport> {
    let status_text = string_field(document, "status")?
        .ok_or_else(|| MessageError::invalid_field("status", "missing"))?;
    let status = ActionStatus::try_from(status_text)
        .map_err(|err| MessageError::invalid_field("status", err.to_string()))?;
    let robot_id = string_field(document, "robot_id")?
        .map(RobotId::new)
        .transpose()
        .map_err(|err| MessageError::invalid_field("robot_id", err.to_string()))?;

    Ok(ActionProgressReport {
        task_id: TaskId::from_uuid(uuid_field(document, "task_id")?),
        action_id: ActionId::from_uuid(uuid_field(document, "action_id")?),
        robot_id,
        status,
        start_time: timestamp_field(document, "start_time")?,
        finish_time: timestamp_field(document, "finish_time")?,
    })
}

/// Reads an optional string field; `null` counts as absent.
fn string_field<'a>(document: &'a Map<String, Value>, field: &str) -> MessageResult<Option<&'a str>> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(MessageError::invalid_field(
            field,
            format!("expected a string, found {other}"),
        )),
    }
}

fn uuid_field(document: &Map<String, Value>, field: &str) -> MessageResult<Uuid> {
    let text = string_field(document, field)?
        .ok_or_else(|| MessageError::invalid_field(field, "missing"))?;
    Uuid::parse_str(text.trim()).map_err(|_| MessageError::MalformedIdentity {
        field: field.to_owned(),
        value: text.to_owned(),
    })
}

fn timestamp_field(document: &Map<String, Value>, field: &str) -> MessageResult<Option<Timestamp>> {
    string_field(document, field)?
        .map(Timestamp::parse)
        .transpose()
        .map_err(|err| MessageError::invalid_field(field, err.to_string()))
}
