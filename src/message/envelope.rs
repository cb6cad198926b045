//! Message envelopes and the factory that builds them from models.

use super::{MessageError, MessageResult, ModelPayload};
use crate::task::domain::{Request, Task, TaskStatus, Timestamp};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// A model that names the schema its payload follows.
pub trait MetaModel {
    /// Returns the meta-model name, for example `task` or `task-request`.
    fn meta_model(&self) -> &str;
}

impl MetaModel for Task {
    fn meta_model(&self) -> &str {
        Self::meta_model(self)
    }
}

impl MetaModel for Request {
    fn meta_model(&self) -> &str {
        Self::meta_model(self)
    }
}

impl MetaModel for TaskStatus {
    fn meta_model(&self) -> &str {
        "task-status"
    }
}

/// Routing and identity metadata of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(rename = "type")]
    message_type: String,
    #[serde(default)]
    metamodel: Option<String>,
    msg_id: Uuid,
    timestamp: Timestamp,
    #[serde(default)]
    receiver_ids: Vec<String>,
}

impl Header {
    /// Creates a header stamped with a fresh message id and the current
    /// time.
    #[must_use]
    pub fn new(
        message_type: impl Into<String>,
        metamodel: Option<String>,
        receiver_ids: Vec<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            metamodel,
            msg_id: Uuid::new_v4(),
            timestamp: Timestamp::now(clock),
            receiver_ids,
        }
    }

    /// Returns the message type.
    #[must_use]
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Returns the envelope schema name, if any.
    #[must_use]
    pub fn metamodel(&self) -> Option<&str> {
        self.metamodel.as_deref()
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn msg_id(&self) -> Uuid {
        self.msg_id
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Returns the intended recipients; empty means broadcast.
    #[must_use]
    pub fn receiver_ids(&self) -> &[String] {
        &self.receiver_ids
    }
}

/// A header plus a camelCase payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    header: Header,
    payload: Value,
}

impl Message {
    /// Wraps a payload in an envelope.
    #[must_use]
    pub const fn new(header: Header, payload: Value) -> Self {
        Self { header, payload }
    }

    /// Returns the header.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Consumes the message and returns the payload.
    #[must_use]
    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// Returns the message type from the header.
    #[must_use]
    pub fn message_type(&self) -> &str {
        self.header.message_type()
    }

    /// Returns the creation time from the header.
    #[must_use]
    pub const fn timestamp(&self) -> &Timestamp {
        self.header.timestamp()
    }

    /// Re-stamps the header with a new message id and the current time,
    /// for resending.
    pub fn refresh(&mut self, clock: &impl Clock) {
        self.header.msg_id = Uuid::new_v4();
        self.header.timestamp = Timestamp::now(clock);
    }

    /// Renders the message as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Serialization`] when rendering fails.
    pub fn to_value(&self) -> MessageResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Builds messages from models, naming schemas after an optional prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFactory {
    prefix: Option<String>,
}

impl MessageFactory {
    /// Creates a factory. With a prefix `p`, schema names follow
    /// `p-<name>-schema.json`; otherwise `<name>-schema.json`.
    #[must_use]
    pub fn new(prefix: Option<&str>) -> Self {
        tracing::debug!(prefix, "initialised message factory");
        Self {
            prefix: prefix.map(str::to_owned),
        }
    }

    /// Returns the schema name for a meta model.
    #[must_use]
    pub fn meta_model_for(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}-{name}-schema.json"),
            None => format!("{name}-schema.json"),
        }
    }

    /// Converts a model to a camelCase payload tagged with its schema.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Serialization`] when the model does not
    /// serialise to a JSON object.
    pub fn create_payload<M>(&self, model: &M) -> MessageResult<Value>
    where
        M: MetaModel + ModelPayload,
    {
        let mut payload = model.to_payload()?;
        let fields = payload.as_object_mut().ok_or_else(|| {
            MessageError::Serialization(format!(
                "{} payload is not a JSON object",
                model.meta_model()
            ))
        })?;
        fields.insert(
            "metamodel".to_owned(),
            Value::String(self.meta_model_for(model.meta_model())),
        );
        Ok(payload)
    }

    /// Creates a header whose type is `message_type` upper-cased.
    #[must_use]
    pub fn create_header(
        &self,
        message_type: &str,
        receiver_ids: Vec<String>,
        clock: &impl Clock,
    ) -> Header {
        Header::new(
            message_type.to_uppercase(),
            Some(self.meta_model_for("msg")),
            receiver_ids,
            clock,
        )
    }

    /// Wraps a model in a message typed after its meta model.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Serialization`] when the model cannot be
    /// converted to a payload.
    pub fn create_message<M>(
        &self,
        model: &M,
        receiver_ids: Vec<String>,
        clock: &impl Clock,
    ) -> MessageResult<Message>
    where
        M: MetaModel + ModelPayload,
    {
        tracing::debug!(meta_model = model.meta_model(), "creating message");
        let payload = self.create_payload(model)?;
        let header = self.create_header(model.meta_model(), receiver_ids, clock);
        Ok(Message::new(header, payload))
    }
}
