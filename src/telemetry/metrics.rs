//! Metrics helpers for the gateway.
//!
//! Thin wrappers over the `metrics` facade; the embedding process decides
//! whether (and where) a recorder is installed.

/// Successful authentication.
pub fn record_auth_success() {
    metrics::counter!("warden_auth_success_total").increment(1);
}

/// Failed authentication attempt.
pub fn record_auth_failure() {
    metrics::counter!("warden_auth_failure_total").increment(1);
}

/// Request rejected at the address filter.
pub fn record_address_rejected() {
    metrics::counter!("warden_address_rejected_total").increment(1);
}

/// Address promoted into the block set.
pub fn record_address_blocked() {
    metrics::counter!("warden_address_blocked_total").increment(1);
}

/// API key or signing secret rotation.
pub fn record_rotation() {
    metrics::counter!("warden_rotation_total").increment(1);
}
