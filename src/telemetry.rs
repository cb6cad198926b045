//! Tracing subscriber installation.

use crate::config::TelemetrySettings;
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

/// Failure to install the global subscriber.
#[derive(Debug, Error)]
#[error("could not install tracing subscriber: {0}")]
pub struct TelemetryError(#[from] TryInitError);

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Output is JSON lines
/// when `settings.json` is set, human-readable otherwise.
///
/// # Errors
///
/// Returns [`TelemetryError`] when a global subscriber is already installed.
pub fn init_tracing(settings: &TelemetrySettings) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let json_layer = settings.json.then(|| fmt::layer().json());
    let text_layer = (!settings.json).then(fmt::layer);

    Registry::default()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;
    Ok(())
}
