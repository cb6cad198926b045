//! The publishing facade.

use super::{ApiError, MiddlewareKind, Transport, TransportFactory};
use crate::config::ApiSettings;
use crate::message::{Message, MessageFactory, MetaModel, ModelPayload};
use mockable::Clock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Publishes messages through every configured middleware.
///
/// The publish table maps a lower-case message type to the transport method
/// used for it; every transport receives every routed message.
pub struct Api {
    transports: Vec<Arc<dyn Transport>>,
    routes: BTreeMap<String, String>,
    messages: MessageFactory,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("transports", &self.middleware())
            .field("routes", &self.routes)
            .field("messages", &self.messages)
            .finish()
    }
}

impl Api {
    /// Builds the facade, asking `factory` for one transport per listed
    /// middleware.
    ///
    /// Middleware listed without a settings block is skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the factory cannot build a
    /// configured transport.
    pub fn from_settings(
        settings: &ApiSettings,
        factory: &dyn TransportFactory,
    ) -> Result<Self, ApiError> {
        let mut transports = Vec::with_capacity(settings.middleware.len());
        for &kind in &settings.middleware {
            let Some(interface) = settings.interface(kind) else {
                warn!(middleware = %kind, "middleware listed but not configured; skipping");
                continue;
            };
            debug!(middleware = %kind, "configuring transport");
            transports.push(factory.create(kind, interface)?);
        }

        let routes: BTreeMap<String, String> = settings
            .publish
            .iter()
            .map(|(message_type, route)| (message_type.to_lowercase(), route.method.clone()))
            .collect();
        debug!(?routes, "publish table");
        info!(transports = transports.len(), "initialised API");

        Ok(Self {
            transports,
            routes,
            messages: MessageFactory::default(),
        })
    }

    /// Replaces the factory used by [`Self::create_message`].
    #[must_use]
    pub fn with_message_factory(mut self, messages: MessageFactory) -> Self {
        self.messages = messages;
        self
    }

    /// Returns the middleware with a live transport, in configuration order.
    #[must_use]
    pub fn middleware(&self) -> Vec<MiddlewareKind> {
        self.transports.iter().map(|transport| transport.kind()).collect()
    }

    /// Returns the publish method for a message type, ignoring case.
    #[must_use]
    pub fn route(&self, message_type: &str) -> Option<&str> {
        self.routes
            .get(&message_type.to_lowercase())
            .map(String::as_str)
    }

    /// Wraps a model in a message using the configured factory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Message`] when the model cannot be serialised.
    pub fn create_message<M>(
        &self,
        model: &M,
        receiver_ids: Vec<String>,
        clock: &impl Clock,
    ) -> Result<Message, ApiError>
    where
        M: MetaModel + ModelPayload,
    {
        Ok(self.messages.create_message(model, receiver_ids, clock)?)
    }

    /// Publishes `message` through every transport.
    ///
    /// A failing transport is logged and does not stop the others. Returns
    /// the number of transports that accepted the message.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NoPublishRoute`] when the message type has no
    /// publish method.
    #[instrument(skip_all, fields(message_type = message.message_type()))]
    pub async fn publish(&self, message: &Message) -> Result<usize, ApiError> {
        let method = self
            .route(message.message_type())
            .ok_or_else(|| ApiError::NoPublishRoute(message.message_type().to_lowercase()))?;

        let mut delivered = 0;
        for transport in &self.transports {
            debug!(middleware = %transport.kind(), method, "publishing");
            match transport.publish(method, message).await {
                Ok(()) => delivered += 1,
                Err(err) => error!(middleware = %transport.kind(), error = %err, "publish failed"),
            }
        }
        Ok(delivered)
    }

    /// Starts every transport, logging the ones that fail.
    pub async fn start(&self) {
        for transport in &self.transports {
            if let Err(err) = transport.start().await {
                error!(middleware = %transport.kind(), error = %err, "could not start transport");
            }
        }
    }

    /// Shuts every transport down, logging the ones that fail.
    pub async fn shutdown(&self) {
        for transport in &self.transports {
            if let Err(err) = transport.shutdown().await {
                warn!(middleware = %transport.kind(), error = %err, "could not shut down transport");
            }
        }
    }
}
