//! Device registry: issuance, verification, revocation and rotation of
//! long-lived API keys.
//!
//! SECURITY: Presented keys are compared in constant time and the scan
//! never exits early, so verification latency does not leak which record
//! (if any) matched.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::RngCore;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Raw entropy per issued key (256 bits, URL-safe base64 encoded).
const KEY_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("device '{0}' already has a live key; revoke or rotate instead")]
    Conflict(String),
}

struct DeviceRecord {
    api_key: String,
    created_at: DateTime<Utc>,
    last_used: Option<DateTime<Utc>>,
}

/// Key-less view of a device record, safe to expose to operators.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub device_id: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

/// A freshly rotated key, to be redistributed to its device out-of-band.
#[derive(Debug, Clone)]
pub struct RotatedKey {
    pub device_id: String,
    pub api_key: String,
}

/// In-memory map of device identities to their issued API keys.
///
/// All mutation happens under a single write guard, so `rotate_all` is
/// atomic with respect to concurrent `verify` calls: a verification sees
/// the pre-rotation or post-rotation key set, never a mix.
pub struct DeviceRegistry {
    records: RwLock<HashMap<String, DeviceRecord>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a fresh API key for a device.
    ///
    /// Fails with [`RegistryError::Conflict`] if the device already has a
    /// live record; re-issuance must go through revoke or rotation.
    pub fn issue(&self, device_id: &str) -> Result<String, RegistryError> {
        let mut records = self.records.write();
        if records.contains_key(device_id) {
            return Err(RegistryError::Conflict(device_id.to_string()));
        }
        let api_key = generate_key();
        records.insert(
            device_id.to_string(),
            DeviceRecord {
                api_key: api_key.clone(),
                created_at: Utc::now(),
                last_used: None,
            },
        );
        Ok(api_key)
    }

    /// Verify a presented API key, updating `last_used` on match.
    ///
    /// Every record is compared; a match does not stop the scan.
    pub fn verify(&self, api_key: &str) -> Option<String> {
        let presented = api_key.as_bytes();
        let mut records = self.records.write();

        let mut matched: Option<String> = None;
        for (device_id, record) in records.iter() {
            let candidate = record.api_key.as_bytes();
            let equal =
                candidate.len() == presented.len() && bool::from(candidate.ct_eq(presented));
            if equal {
                matched = Some(device_id.clone());
            }
        }

        if let Some(device_id) = &matched {
            if let Some(record) = records.get_mut(device_id) {
                record.last_used = Some(Utc::now());
            }
        }
        matched
    }

    /// Remove a device's record. Idempotent.
    pub fn revoke(&self, device_id: &str) {
        self.records.write().remove(device_id);
    }

    /// Replace every record's key with a freshly generated one, inside a
    /// single critical section. Previously distributed keys are invalid the
    /// moment this returns; the fresh keys are handed back for out-of-band
    /// redistribution.
    pub fn rotate_all(&self) -> Vec<RotatedKey> {
        let mut records = self.records.write();
        let mut rotated = Vec::with_capacity(records.len());
        for (device_id, record) in records.iter_mut() {
            record.api_key = generate_key();
            record.last_used = None;
            rotated.push(RotatedKey {
                device_id: device_id.clone(),
                api_key: record.api_key.clone(),
            });
        }
        rotated
    }

    pub fn device_count(&self) -> usize {
        self.records.read().len()
    }

    /// Operator listing of registered devices, without key material.
    pub fn snapshot(&self) -> Vec<DeviceSummary> {
        self.records
            .read()
            .iter()
            .map(|(device_id, record)| DeviceSummary {
                device_id: device_id.clone(),
                created_at: record.created_at,
                last_used: record.last_used,
            })
            .collect()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
