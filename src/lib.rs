//! WARDEN-CORE Gateway
//!
//! A device-access control and token-issuance core that sits in front of a
//! local network service. The request layer asks it one question — "may
//! this address, with this credential, proceed?" — and gets back a verified
//! device identity or a rejection.
//!
//! # Design Principles
//!
//! - **Fail closed**: unparseable addresses, unknown credentials and
//!   blocked callers are rejected before any work happens
//! - **In memory**: all device/key state lives in the process; restart
//!   means re-provisioning
//! - **Synchronous**: no authentication path blocks on I/O or suspends;
//!   every operation completes in bounded time
//! - **Explicit state**: one [`Gateway`] handle owns all mutable state, no
//!   ambient globals
//!
//! # Security Boundaries
//!
//! - Addresses: static CIDR allow-ranges plus a dynamic block set
//! - Credentials: long-lived API keys (constant-time compared) and
//!   HS256-signed session tokens
//! - Brute force: per-address failure tracking with threshold auto-block
//! - Transport: TLS 1.3-only server configuration, AEAD suites only

pub mod config;
pub mod gate;
pub mod registry;
pub mod telemetry;
pub mod tls;
pub mod token;

use std::time::Duration;

use ipnet::IpNet;

use gate::parse_networks;
pub use gate::{AuthError, CredentialKind, DeviceIdentity, Gateway};
pub use registry::{DeviceRegistry, DeviceSummary, RegistryError, RotatedKey};
pub use tls::{build_tls_config, ConfigError};
pub use token::{DeviceClaims, TokenError, TokenService, DEFAULT_TOKEN_TTL};

/// Allow-range used when none is configured: the local network.
pub const DEFAULT_ALLOWED_NETWORK: &str = "192.168.0.0/16";

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// CIDR ranges clients may connect from. Immutable at runtime.
    pub allowed_networks: Vec<IpNet>,
    /// Auth failures before an address is auto-blocked.
    pub failure_threshold: u32,
    /// How long failure records are retained before cleanup drops them.
    pub failure_retention: Duration,
    /// Default session token lifetime.
    pub token_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            allowed_networks: parse_networks(&[DEFAULT_ALLOWED_NETWORK.to_string()]),
            failure_threshold: 5,
            failure_retention: Duration::from_secs(3600),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}
