//! Conversion between model records and camelCase payloads.

use super::{
    MessageError, MessageResult,
    naming::{camelize_keys, underscore_keys},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A model that can travel as a message payload.
///
/// Implemented for every serde model: keys are camelized on the way out
/// and underscored on the way in.
pub trait ModelPayload: Sized {
    /// Renders the model as a camelCase JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Serialization`] when the model cannot be
    /// serialised.
    fn to_payload(&self) -> MessageResult<Value>;

    /// Rebuilds the model from a camelCase payload.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidField`] when the payload does not
    /// describe a valid model.
    fn from_payload(payload: Value) -> MessageResult<Self>;
}

impl<T> ModelPayload for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_payload(&self) -> MessageResult<Value> {
        Ok(camelize_keys(serde_json::to_value(self)?))
    }

    fn from_payload(payload: Value) -> MessageResult<Self> {
        serde_json::from_value(underscore_keys(payload))
            .map_err(|err| MessageError::invalid_field("payload", err.to_string()))
    }
}
