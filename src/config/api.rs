//! Middleware and publish routing configuration.

use crate::api::MiddlewareKind;
use serde::Deserialize;
use std::collections::BTreeMap;

/// API configuration settings.
///
/// ```toml
/// [api]
/// middleware = ["zyre", "rest"]
///
/// [api.publish.task]
/// method = "shout"
///
/// [api.zyre]
/// node_name = "ccu"
/// groups = ["ROPOD"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiSettings {
    /// Middleware to bring up, in order.
    #[serde(default)]
    pub middleware: Vec<MiddlewareKind>,
    /// Publish method per lower-case message type.
    #[serde(default)]
    pub publish: BTreeMap<String, PublishRoute>,
    /// Zyre interface settings.
    #[serde(default)]
    pub zyre: Option<MiddlewareSettings>,
    /// ROS interface settings.
    #[serde(default)]
    pub ros: Option<MiddlewareSettings>,
    /// REST interface settings.
    #[serde(default)]
    pub rest: Option<MiddlewareSettings>,
}

impl ApiSettings {
    /// Returns the settings block for a middleware, if configured.
    #[must_use]
    pub const fn interface(&self, kind: MiddlewareKind) -> Option<&MiddlewareSettings> {
        match kind {
            MiddlewareKind::Zyre => self.zyre.as_ref(),
            MiddlewareKind::Ros => self.ros.as_ref(),
            MiddlewareKind::Rest => self.rest.as_ref(),
        }
    }
}

/// How messages of one type are published.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishRoute {
    /// Transport method name, for example `shout` or `whisper`.
    pub method: String,
}

/// Settings shared by every middleware interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MiddlewareSettings {
    /// Node name announced on the network.
    #[serde(default)]
    pub node_name: Option<String>,
    /// Groups or topics to join.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Message types to receive.
    #[serde(default)]
    pub message_types: Vec<String>,
    /// Transport-specific options.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}
