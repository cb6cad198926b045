//! Layered configuration for the tracker and its middleware.
//!
//! Values come from built-in defaults, then an optional file, then
//! `CONVOY__`-prefixed environment variables (`__` separates sections, so
//! `CONVOY__TELEMETRY__LOG_LEVEL=debug` sets `telemetry.log_level`).
//!
//! # Example
//!
//! ```
//! use convoy::config::Settings;
//!
//! let settings = Settings::from_toml(
//!     r#"
//!     [tracker]
//!     archive_statuses = ["completed", "canceled"]
//!     "#,
//! )
//! .expect("valid configuration");
//!
//! assert_eq!(settings.tracker.archive_statuses.len(), 2);
//! assert_eq!(settings.telemetry.log_level, "info");
//! ```

pub mod api;
pub mod telemetry;
pub mod tracker;

pub use api::{ApiSettings, MiddlewareSettings, PublishRoute};
pub use telemetry::TelemetrySettings;
pub use tracker::TrackerSettings;

use crate::task::services::DEFAULT_MAX_UPDATE_ATTEMPTS;
use ::config::{
    Config, ConfigError, Environment, File, FileFormat,
    builder::{ConfigBuilder, DefaultState},
};
use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CONVOY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Middleware and publish routing.
    #[serde(default)]
    pub api: ApiSettings,
    /// Status tracking behaviour.
    #[serde(default)]
    pub tracker: TrackerSettings,
    /// Logging output.
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Loads settings from defaults and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Loads settings from defaults, an optional file, and the environment.
    ///
    /// The file format follows its extension (`.toml`, `.yaml`, `.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the merged
    /// configuration does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = defaults()?;
        if let Some(file) = path {
            builder = builder.add_source(File::from(file));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api.middleware")
                    .with_list_parse_key("tracker.archive_statuses")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Loads settings from defaults and an inline TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or does not
    /// deserialize.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default(
            "tracker.max_update_attempts",
            i64::from(DEFAULT_MAX_UPDATE_ATTEMPTS),
        )?
        .set_default("telemetry.log_level", "info")?
        .set_default("telemetry.json", false)
}

#[cfg(test)]
mod tests;
