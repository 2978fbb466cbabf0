//! Stateless session tokens: HS256-signed claims bound to a device identity.
//!
//! A token is valid only under the signing secret active at verification
//! time. Rotating the secret therefore invalidates every outstanding token
//! at once; there is no per-token revocation path.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw entropy for the signing secret.
const SECRET_BYTES: usize = 32;

/// Default token lifetime: 30 days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session token has expired")]
    Expired,

    #[error("session token signature could not be verified")]
    InvalidSignature,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceClaims {
    pub device_id: String,
    /// Issued-at, seconds since epoch.
    pub iat: u64,
    /// Expiry, seconds since epoch.
    pub exp: u64,
}

/// Issues and verifies signed session tokens.
///
/// The secret is swapped atomically under a write guard; an in-flight
/// verification sees the old or the new secret, never a torn value.
pub struct TokenService {
    secret: RwLock<[u8; SECRET_BYTES]>,
}

impl TokenService {
    /// Create a service with a fresh random signing secret.
    pub fn new() -> Self {
        Self {
            secret: RwLock::new(generate_secret()),
        }
    }

    /// Issue a token for `device_id` expiring after `ttl`.
    ///
    /// No registry cross-check happens here; the caller decides whether
    /// the device is legitimate before asking for a token.
    pub fn issue(&self, device_id: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = now_secs();
        let claims = DeviceClaims {
            device_id: device_id.to_string(),
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
        };
        let secret = self.secret.read();
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&*secret),
        )
        .map_err(|_| TokenError::InvalidSignature)
    }

    /// Verify a token under the current secret, with zero leeway.
    pub fn verify(&self, token: &str) -> Result<DeviceClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let secret = self.secret.read();
        let data = decode::<DeviceClaims>(
            token,
            &DecodingKey::from_secret(&*secret),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::InvalidSignature,
        })?;
        drop(secret);

        // The library treats exp == now as still valid; a zero-ttl token
        // must already be expired at the instant it was issued.
        if data.claims.exp <= now_secs() {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }

    /// Swap in a fresh signing secret, invalidating all outstanding tokens.
    pub fn rotate_secret(&self) {
        *self.secret.write() = generate_secret();
    }
}

impl Default for TokenService {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_secret() -> [u8; SECRET_BYTES] {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_returns_same_device_id() {
        let service = TokenService::new();
        let token = service.issue("glasses-01", DEFAULT_TOKEN_TTL).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.device_id, "glasses-01");
        assert_eq!(claims.exp, claims.iat + DEFAULT_TOKEN_TTL.as_secs());
    }

    #[test]
    fn zero_ttl_token_is_already_expired() {
        let service = TokenService::new();
        let token = service.issue("glasses-01", Duration::ZERO).unwrap();
        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn rotation_invalidates_outstanding_tokens() {
        let service = TokenService::new();
        let token = service.issue("glasses-01", DEFAULT_TOKEN_TTL).unwrap();
        service.rotate_secret();
        assert!(matches!(
            service.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn foreign_and_garbage_tokens_rejected() {
        let service = TokenService::new();
        let other = TokenService::new();
        let foreign = other.issue("glasses-01", DEFAULT_TOKEN_TTL).unwrap();
        assert!(matches!(
            service.verify(&foreign),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(
            service.verify("not.a.token"),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(
            service.verify(""),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_payload_rejected() {
        let service = TokenService::new();
        let token = service.issue("glasses-01", DEFAULT_TOKEN_TTL).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1] = parts[1].chars().rev().collect();
        let tampered = parts.join(".");
        assert!(matches!(
            service.verify(&tampered),
            Err(TokenError::InvalidSignature)
        ));
    }
}
