//! Transport contracts implemented outside this crate.

use super::{MiddlewareKind, TransportError};
use crate::config::MiddlewareSettings;
use crate::message::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// A connection to one middleware.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the middleware this transport speaks.
    fn kind(&self) -> MiddlewareKind;

    /// Sends `message` using the named method (for example `shout`).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::UnknownMethod`] for methods the transport
    /// lacks and [`TransportError::Delivery`] when sending fails.
    async fn publish(&self, method: &str, message: &Message) -> Result<(), TransportError>;

    /// Brings the transport up.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Delivery`] when the network cannot be
    /// joined.
    async fn start(&self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Tears the transport down.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Delivery`] when leaving the network fails.
    async fn shutdown(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Builds transports for configured middleware.
pub trait TransportFactory {
    /// Creates the transport for `kind` from its settings block.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unsupported`] when the factory has no
    /// implementation for `kind`, or [`TransportError::Configuration`] when
    /// the settings are unusable.
    fn create(
        &self,
        kind: MiddlewareKind,
        settings: &MiddlewareSettings,
    ) -> Result<Arc<dyn Transport>, TransportError>;
}
