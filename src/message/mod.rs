//! Message boundary between the task model and the middleware.
//!
//! Model records use snake_case field names; messages on the wire use
//! camelCase. Everything crossing the boundary goes through [`naming`] so
//! the two spellings never leak into each other.
//!
//! # Example
//!
//! ```
//! use convoy::message::{MessageFactory, ModelPayload};
//! use convoy::task::domain::Request;
//! use mockable::DefaultClock;
//!
//! let request = Request::task(true);
//! let factory = MessageFactory::new(Some("ropod"));
//! let message = factory
//!     .create_message(&request, Vec::new(), &DefaultClock)
//!     .expect("request serializes");
//!
//! assert_eq!(message.message_type(), "TASK-REQUEST");
//! assert_eq!(message.header().metamodel(), Some("ropod-msg-schema.json"));
//! assert!(message.payload().get("requestId").is_some());
//! ```

pub mod envelope;
pub mod error;
pub mod inbound;
pub mod naming;
pub mod payload;

pub use envelope::{Header, Message, MessageFactory, MetaModel};
pub use error::{MessageError, MessageResult};
pub use inbound::{
    ActionProgressReport, DecodedBatch, InboundMessage, RejectedRecord, decode_batch,
    decode_message,
};
pub use payload::ModelPayload;

#[cfg(test)]
mod tests;
