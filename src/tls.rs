//! Hardened TLS server configuration.
//!
//! TLS 1.3 only, which restricts the negotiable suites to the AEAD
//! forward-secret set (AES-GCM and ChaCha20-Poly1305) and rules out
//! protocol-level compression. A [`ConfigError`] here is fatal: callers
//! must refuse to start rather than serve without a valid transport
//! configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read certificate {path}: {source}")]
    CertificateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read private key {path}: {source}")]
    KeyRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),

    #[error("no private key found in {0}")]
    NoPrivateKey(PathBuf),

    #[error("invalid certificate/key configuration: {0}")]
    Tls(#[from] rustls::Error),
}

/// Build a TLS 1.3-only server configuration from PEM files.
pub fn build_tls_config(cert_path: &Path, key_path: &Path) -> Result<Arc<ServerConfig>, ConfigError> {
    let certs = load_cert_chain(cert_path)?;
    let key = load_private_key(key_path)?;

    let config = ServerConfig::builder_with_protocol_versions(&[&rustls::version::TLS13])
        .with_no_client_auth()
        .with_single_cert(certs, key)?;

    Ok(Arc::new(config))
}

fn load_cert_chain(path: &Path) -> Result<Vec<CertificateDer<'static>>, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::CertificateRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::CertificateRead {
            path: path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(ConfigError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let key = rustls_pemfile::private_key(&mut reader).map_err(|source| ConfigError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    key.ok_or_else(|| ConfigError::NoPrivateKey(path.to_path_buf()))
}
