//! Structured logging for security-relevant gateway events.
//!
//! SECURITY: Credential material is never written to the log. Call sites
//! that need to correlate a presented credential use [`fingerprint`]
//! instead of the raw value.

use sha2::{Digest, Sha256};

/// Security event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    /// Successful authentication.
    AuthSuccess,
    /// Failed authentication attempt.
    AuthFailure,
    /// Request rejected at the address filter.
    AddressRejected,
    /// Address promoted into the block set after repeated failures.
    AddressAutoBlocked,
    /// Operator blocked an address explicitly.
    AddressBlocked,
    /// Operator unblocked an address.
    AddressUnblocked,
    /// API key issued for a device.
    KeyIssued,
    /// Device access revoked.
    KeyRevoked,
    /// All API keys rotated.
    KeysRotated,
    /// Token signing secret rotated.
    SecretRotated,
    /// Session token issued.
    TokenIssued,
}

impl SecurityEvent {
    /// Severity level for this event.
    pub fn severity(&self) -> SecuritySeverity {
        match self {
            Self::AuthSuccess => SecuritySeverity::Info,
            Self::AuthFailure => SecuritySeverity::Warning,
            Self::AddressRejected => SecuritySeverity::Warning,
            Self::AddressAutoBlocked => SecuritySeverity::Warning,
            Self::AddressBlocked => SecuritySeverity::Info,
            Self::AddressUnblocked => SecuritySeverity::Info,
            Self::KeyIssued => SecuritySeverity::Info,
            Self::KeyRevoked => SecuritySeverity::Info,
            Self::KeysRotated => SecuritySeverity::Info,
            Self::SecretRotated => SecuritySeverity::Info,
            Self::TokenIssued => SecuritySeverity::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthSuccess => "auth_success",
            Self::AuthFailure => "auth_failure",
            Self::AddressRejected => "address_rejected",
            Self::AddressAutoBlocked => "address_auto_blocked",
            Self::AddressBlocked => "address_blocked",
            Self::AddressUnblocked => "address_unblocked",
            Self::KeyIssued => "key_issued",
            Self::KeyRevoked => "key_revoked",
            Self::KeysRotated => "keys_rotated",
            Self::SecretRotated => "secret_rotated",
            Self::TokenIssued => "token_issued",
        }
    }
}

/// Severity levels for security events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecuritySeverity {
    Info,
    Warning,
    Critical,
}

impl SecuritySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Log a security event with structured key-value details.
pub fn log_security_event(event: SecurityEvent, message: &str, details: &[(&str, &str)]) {
    let details_str = details
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ");

    let line = if details_str.is_empty() {
        format!("SECURITY {} {}: {}", event.severity().as_str(), event.as_str(), message)
    } else {
        format!(
            "SECURITY {} {}: {} | {}",
            event.severity().as_str(),
            event.as_str(),
            message,
            details_str
        )
    };

    match event.severity() {
        SecuritySeverity::Info => tracing::info!("{}", line),
        SecuritySeverity::Warning => tracing::warn!("{}", line),
        SecuritySeverity::Critical => tracing::error!("{}", line),
    }
}

/// SHA-256 hex digest of a sensitive value, for log correlation without
/// exposing the value itself.
pub fn fingerprint(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_severity_mapping() {
        assert_eq!(SecurityEvent::AuthSuccess.severity(), SecuritySeverity::Info);
        assert_eq!(SecurityEvent::AuthFailure.severity(), SecuritySeverity::Warning);
        assert_eq!(
            SecurityEvent::AddressAutoBlocked.severity(),
            SecuritySeverity::Warning
        );
    }

    #[test]
    fn event_as_str() {
        assert_eq!(SecurityEvent::AuthFailure.as_str(), "auth_failure");
        assert_eq!(SecurityEvent::KeysRotated.as_str(), "keys_rotated");
    }

    #[test]
    fn severity_ordering() {
        assert!(SecuritySeverity::Critical > SecuritySeverity::Warning);
        assert!(SecuritySeverity::Warning > SecuritySeverity::Info);
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let fp = fingerprint("sensitive-key");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fingerprint("sensitive-key"));
        assert_ne!(fp, fingerprint("sensitive-key2"));
    }
}
