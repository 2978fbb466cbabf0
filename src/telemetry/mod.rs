//! Telemetry module for the gateway.
//!
//! Structured logging, security event logging and metrics counters. All
//! output goes through the `tracing` and `metrics` facades; the embedding
//! process owns subscriber and recorder installation.

mod logging;
mod metrics;
pub mod security_log;

pub use logging::{init_logging, LogError, LogFormat};
pub use metrics::{
    record_address_blocked, record_address_rejected, record_auth_failure, record_auth_success,
    record_rotation,
};
pub use security_log::{fingerprint, log_security_event, SecurityEvent, SecuritySeverity};
