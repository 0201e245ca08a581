//! # Logging Setup
//!
//! Structured logging initialisation driven by [`LoggingConfig`].
//!
//! The `RUST_LOG` environment variable takes precedence over the configured
//! level so deployments can raise verbosity without editing configuration.

use crate::config::LoggingConfig;
use crate::error::{Result, SessionError};
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| SessionError::Config(format!("Failed to install subscriber: {e}")))
}
