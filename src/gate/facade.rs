//! Security facade: the single entry point the request layer calls.
//!
//! SECURITY: The address filter runs first, so blocked callers never touch
//! credential state. Every authentication failure is reported to the
//! attempt tracker. Internal logging records the specific failure cause;
//! callers are expected to surface one uniform rejection to the remote
//! party so the cause cannot be used as an oracle.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::attempts::AttemptTracker;
use super::filter::{normalize_ip, AddressFilter};
use crate::registry::{DeviceRegistry, DeviceSummary, RegistryError, RotatedKey};
use crate::telemetry::{
    fingerprint, log_security_event, record_address_rejected, record_auth_failure,
    record_auth_success, record_rotation, SecurityEvent,
};
use crate::token::{TokenError, TokenService};
use crate::GatewayConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("address blocked or outside the allowed ranges")]
    AddressBlocked,

    #[error("credential does not match any registered device")]
    InvalidCredential,

    #[error("session token has expired")]
    Expired,

    #[error("session token signature is invalid")]
    InvalidSignature,
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::Expired,
            TokenError::InvalidSignature => Self::InvalidSignature,
        }
    }
}

/// How a credential was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    ApiKey,
    SessionToken,
}

impl CredentialKind {
    /// Session tokens are the only credential with the three-segment
    /// dotted shape; everything else is treated as an API key.
    fn detect(credential: &str) -> Self {
        if credential.bytes().filter(|b| *b == b'.').count() == 2 {
            Self::SessionToken
        } else {
            Self::ApiKey
        }
    }
}

/// A verified device identity, returned to the request layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub method: CredentialKind,
}

/// The gateway guard composing filter, tracker, registry and token service.
///
/// One instance is created at process start and shared by all
/// request-handling tasks; every operation is synchronous and completes in
/// bounded time.
pub struct Gateway {
    filter: Arc<AddressFilter>,
    attempts: AttemptTracker,
    registry: DeviceRegistry,
    tokens: TokenService,
    token_ttl: Duration,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        let filter = Arc::new(AddressFilter::new(config.allowed_networks));
        let attempts = AttemptTracker::new(
            filter.clone(),
            config.failure_threshold,
            config.failure_retention,
        );
        Self {
            filter,
            attempts,
            registry: DeviceRegistry::new(),
            tokens: TokenService::new(),
            token_ttl: config.token_ttl,
        }
    }

    /// Authenticate a claimed client address and credential.
    pub fn authenticate(
        &self,
        address: &str,
        credential: &str,
    ) -> Result<DeviceIdentity, AuthError> {
        let ip = match address.parse::<IpAddr>() {
            Ok(ip) => normalize_ip(ip),
            Err(_) => {
                record_address_rejected();
                log_security_event(
                    SecurityEvent::AddressRejected,
                    "unparseable client address",
                    &[("address", address)],
                );
                return Err(AuthError::AddressBlocked);
            }
        };

        if !self.filter.is_allowed_ip(ip) {
            self.attempts.record_failure(ip);
            record_address_rejected();
            log_security_event(
                SecurityEvent::AddressRejected,
                "client address rejected",
                &[("address", &ip.to_string())],
            );
            return Err(AuthError::AddressBlocked);
        }

        let kind = CredentialKind::detect(credential);
        let result = match kind {
            CredentialKind::ApiKey => self
                .registry
                .verify(credential)
                .map(|device_id| DeviceIdentity {
                    device_id,
                    method: kind,
                })
                .ok_or(AuthError::InvalidCredential),
            CredentialKind::SessionToken => self
                .tokens
                .verify(credential)
                .map(|claims| DeviceIdentity {
                    device_id: claims.device_id,
                    method: kind,
                })
                .map_err(AuthError::from),
        };

        match &result {
            Ok(identity) => {
                record_auth_success();
                log_security_event(
                    SecurityEvent::AuthSuccess,
                    "device authenticated",
                    &[
                        ("device_id", &identity.device_id),
                        ("address", &ip.to_string()),
                    ],
                );
            }
            Err(err) => {
                self.attempts.record_failure(ip);
                record_auth_failure();
                log_security_event(
                    SecurityEvent::AuthFailure,
                    "credential rejected",
                    &[
                        ("address", &ip.to_string()),
                        ("credential_fp", &fingerprint(credential)),
                        ("reason", &err.to_string()),
                    ],
                );
            }
        }
        result
    }

    // ── Administrative surface (operator interface) ──

    /// Issue a fresh API key for a device.
    pub fn issue_key(&self, device_id: &str) -> Result<String, RegistryError> {
        let key = self.registry.issue(device_id)?;
        log_security_event(
            SecurityEvent::KeyIssued,
            "api key issued",
            &[("device_id", device_id)],
        );
        Ok(key)
    }

    /// Revoke a device's access. Idempotent.
    pub fn revoke_device(&self, device_id: &str) {
        self.registry.revoke(device_id);
        log_security_event(
            SecurityEvent::KeyRevoked,
            "device access revoked",
            &[("device_id", device_id)],
        );
    }

    /// Rotate every issued API key. Returns the fresh keys for out-of-band
    /// redistribution; the old keys are invalid the moment this returns.
    pub fn rotate_all_keys(&self) -> Vec<RotatedKey> {
        let rotated = self.registry.rotate_all();
        record_rotation();
        log_security_event(
            SecurityEvent::KeysRotated,
            "all api keys rotated",
            &[("devices", &rotated.len().to_string())],
        );
        rotated
    }

    /// Issue a session token with the configured default TTL.
    pub fn issue_token(&self, device_id: &str) -> Result<String, TokenError> {
        self.issue_token_with_ttl(device_id, self.token_ttl)
    }

    /// Issue a session token with an explicit TTL.
    pub fn issue_token_with_ttl(
        &self,
        device_id: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let token = self.tokens.issue(device_id, ttl)?;
        log_security_event(
            SecurityEvent::TokenIssued,
            "session token issued",
            &[("device_id", device_id), ("ttl_secs", &ttl.as_secs().to_string())],
        );
        Ok(token)
    }

    /// Rotate the token signing secret, invalidating all outstanding tokens.
    pub fn rotate_token_secret(&self) {
        self.tokens.rotate_secret();
        record_rotation();
        log_security_event(SecurityEvent::SecretRotated, "token signing secret rotated", &[]);
    }

    /// Rotate both the API keys and the signing secret in one operator
    /// action, invalidating every outstanding credential at once.
    pub fn rotate_credentials(&self) -> Vec<RotatedKey> {
        let rotated = self.rotate_all_keys();
        self.rotate_token_secret();
        rotated
    }

    /// Block an address explicitly.
    pub fn block(&self, ip: IpAddr) {
        self.filter.block(ip);
        log_security_event(
            SecurityEvent::AddressBlocked,
            "address blocked by operator",
            &[("address", &ip.to_string())],
        );
    }

    /// Unblock an address and forget its failure record, so the next
    /// failure starts a fresh count instead of re-blocking immediately.
    pub fn unblock(&self, ip: IpAddr) {
        self.filter.unblock(ip);
        self.attempts.clear(ip);
        log_security_event(
            SecurityEvent::AddressUnblocked,
            "address unblocked by operator",
            &[("address", &ip.to_string())],
        );
    }

    /// Drop failure records older than the retention window. Driven by an
    /// external periodic trigger.
    pub fn cleanup(&self) {
        self.attempts.cleanup();
    }

    // ── Introspection ──

    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.filter.is_blocked(ip)
    }

    pub fn failure_count(&self, ip: IpAddr) -> Option<u32> {
        self.attempts.failure_count(ip)
    }

    pub fn device_count(&self) -> usize {
        self.registry.device_count()
    }

    /// Operator listing of registered devices, without key material.
    pub fn devices(&self) -> Vec<DeviceSummary> {
        self.registry.snapshot()
    }
}
