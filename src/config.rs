//! Gateway configuration loading from environment variables.
//!
//! All configuration values are loaded from `WARDEN_*` environment
//! variables with sensible defaults. Invalid values fall back to defaults
//! without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `WARDEN_ALLOWED_NETWORKS` | `192.168.0.0/16` | Comma-separated CIDR allow-ranges |
//! | `WARDEN_FAILURE_THRESHOLD` | 5 | Auth failures before auto-block |
//! | `WARDEN_FAILURE_RETENTION` | 3600 | Failure record retention (secs) |
//! | `WARDEN_TOKEN_TTL` | 2592000 | Session token lifetime (secs) |
//! | `WARDEN_TLS_CERT` | `cert.pem` | Server certificate chain (PEM) |
//! | `WARDEN_TLS_KEY` | `key.pem` | Server private key (PEM) |
//! | `WARDEN_LOG_LEVEL` | `info` | tracing filter expression |

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::gate::parse_networks;
use crate::{GatewayConfig, DEFAULT_ALLOWED_NETWORK, DEFAULT_TOKEN_TTL};

/// Environment variable reference for `config defaults` output.
pub const ENV_KEYS_HELP: &[&str] = &[
    "WARDEN_ALLOWED_NETWORKS  192.168.0.0/16  comma-separated CIDR allow-ranges",
    "WARDEN_FAILURE_THRESHOLD 5               auth failures before auto-block",
    "WARDEN_FAILURE_RETENTION 3600            failure record retention (secs)",
    "WARDEN_TOKEN_TTL         2592000         session token lifetime (secs)",
    "WARDEN_TLS_CERT          cert.pem        server certificate chain (PEM)",
    "WARDEN_TLS_KEY           key.pem         server private key (PEM)",
    "WARDEN_LOG_LEVEL         info            tracing filter expression",
];

/// Effective configuration summary (serializable, for `config show`).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub allowed_networks: Vec<String>,
    pub failure_threshold: u32,
    pub failure_retention_secs: u64,
    pub token_ttl_secs: u64,
    pub tls_cert: PathBuf,
    pub tls_key: PathBuf,
    pub log_level: String,
}

/// All gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub gateway: GatewayConfig,
    pub tls_cert: PathBuf,
    pub tls_key: PathBuf,
    pub log_level: String,
}

/// Parse a `u32` env var, returning `default` on missing or invalid.
fn parse_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u32>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_path(key: &str, default: &str) -> PathBuf {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => PathBuf::from(val),
        _ => PathBuf::from(default),
    }
}

/// Load the allow-ranges from `WARDEN_ALLOWED_NETWORKS`.
///
/// Entries that do not parse are skipped; if nothing valid remains the
/// default local-network range is used rather than an empty (deny-all)
/// list.
fn load_allowed_networks() -> Vec<ipnet::IpNet> {
    let raw = std::env::var("WARDEN_ALLOWED_NETWORKS")
        .unwrap_or_else(|_| DEFAULT_ALLOWED_NETWORK.to_string());
    let entries: Vec<String> = raw.split(',').map(str::to_string).collect();
    let nets = parse_networks(&entries);
    if nets.is_empty() {
        parse_networks(&[DEFAULT_ALLOWED_NETWORK.to_string()])
    } else {
        nets
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let failure_threshold = parse_u32("WARDEN_FAILURE_THRESHOLD", 5).max(1);
    let retention_secs = parse_u64("WARDEN_FAILURE_RETENTION", 3600).max(1);
    let token_ttl_secs = parse_u64("WARDEN_TOKEN_TTL", DEFAULT_TOKEN_TTL.as_secs());

    EnvConfig {
        gateway: GatewayConfig {
            allowed_networks: load_allowed_networks(),
            failure_threshold,
            failure_retention: Duration::from_secs(retention_secs),
            token_ttl: Duration::from_secs(token_ttl_secs),
        },
        tls_cert: parse_path("WARDEN_TLS_CERT", "cert.pem"),
        tls_key: parse_path("WARDEN_TLS_KEY", "key.pem"),
        log_level: std::env::var("WARDEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            allowed_networks: self
                .gateway
                .allowed_networks
                .iter()
                .map(|net| net.to_string())
                .collect(),
            failure_threshold: self.gateway.failure_threshold,
            failure_retention_secs: self.gateway.failure_retention.as_secs(),
            token_ttl_secs: self.gateway.token_ttl.as_secs(),
            tls_cert: self.tls_cert.clone(),
            tls_key: self.tls_key.clone(),
            log_level: self.log_level.clone(),
        }
    }
}
