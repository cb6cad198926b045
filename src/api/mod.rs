//! Facade over the middleware used to exchange messages with robots and
//! other fleet components.
//!
//! The set of middleware is closed ([`MiddlewareKind`]); concrete transports
//! are supplied by a [`TransportFactory`] when the [`Api`] is built, so the
//! facade itself never depends on a network stack.

mod error;
mod facade;
mod ingest;
mod middleware;
mod transport;

pub use error::{ApiError, TransportError};
pub use facade::Api;
pub use ingest::{IngestError, IngestOutcome, IngestSummary, Ingestor};
pub use middleware::{MiddlewareKind, ParseMiddlewareKindError};
pub use transport::{Transport, TransportFactory};

#[cfg(test)]
mod tests;
