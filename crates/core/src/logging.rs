//! Structured logging for TacMesh.
//!
//! Centralized `tracing` subscriber setup with human-readable or JSON output.
//! The level filter comes from `RUST_LOG` and falls back to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{CoreError, Result};

const DEFAULT_DIRECTIVE: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Initialize the logging system with human-readable output.
///
/// # Example
/// ```no_run
/// use tacmesh_core::logging;
///
/// logging::init().expect("logging");
/// tracing::info!("Dashboard started");
/// ```
pub fn init() -> Result<()> {
    install(LogFormat::Pretty)
}

/// Initialize the logging system with JSON output for log aggregation.
pub fn init_json() -> Result<()> {
    install(LogFormat::Json)
}

/// Initialize logging from the `[logging]` config section.
pub fn init_from_config(config: &LoggingConfig) -> Result<()> {
    install(config.format)
}

fn install(format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let outcome = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
    };
    outcome.map_err(|e| CoreError::Logging(e.to_string()))
}
