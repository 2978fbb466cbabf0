//! Logging initialization for the gateway.
//!
//! JSON output for production, pretty printing for development. The filter
//! expression comes from configuration (`WARDEN_LOG_LEVEL`).

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging (default for production).
    #[default]
    Json,
    /// Human-readable pretty printing (for development).
    Pretty,
}

/// Errors that can occur during logging initialization.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("subscriber already initialized")]
    AlreadyInitialized,
}

/// Initialize the tracing subscriber. Call once at process startup.
pub fn init_logging(format: LogFormat, level: &str) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(level).map_err(|e| LogError::InvalidFilter(e.to_string()))?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json())
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty())
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized),
    }
}
