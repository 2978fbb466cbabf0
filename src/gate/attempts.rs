//! Per-address tracking of failed authentication attempts.
//!
//! Addresses that keep failing are promoted into the block set of the
//! [`AddressFilter`]. Promotion is one-way from this module's point of
//! view: unblocking is an explicit operator action on the filter.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::filter::{normalize_ip, AddressFilter};
use crate::telemetry::{log_security_event, record_address_blocked, SecurityEvent};

struct FailureRecord {
    count: u32,
    first_attempt: Instant,
}

/// Tracks consecutive authentication failures per client address.
///
/// `cleanup` is driven by an external periodic trigger; the tracker owns
/// no timer of its own.
pub struct AttemptTracker {
    failures: DashMap<IpAddr, FailureRecord>,
    filter: Arc<AddressFilter>,
    threshold: u32,
    retention: Duration,
}

impl AttemptTracker {
    pub fn new(filter: Arc<AddressFilter>, threshold: u32, retention: Duration) -> Self {
        Self {
            failures: DashMap::new(),
            filter,
            threshold: threshold.max(1),
            retention,
        }
    }

    /// Record one failed attempt. At the configured threshold the address
    /// is pushed into the filter's block set.
    ///
    /// Failures against an already-blocked address still increment the
    /// record, so repeated knocking on a blocked door stays observable.
    pub fn record_failure(&self, ip: IpAddr) {
        let ip = normalize_ip(ip);
        let count = {
            let mut record = self.failures.entry(ip).or_insert_with(|| FailureRecord {
                count: 0,
                first_attempt: Instant::now(),
            });
            record.count += 1;
            record.count
        };

        if count >= self.threshold {
            let newly_blocked = self.filter.block(ip);
            if newly_blocked {
                record_address_blocked();
                log_security_event(
                    SecurityEvent::AddressAutoBlocked,
                    "address blocked after repeated auth failures",
                    &[("address", &ip.to_string()), ("failures", &count.to_string())],
                );
            }
        }
    }

    /// Drop failure records older than the retention window.
    pub fn cleanup(&self) {
        self.failures
            .retain(|_, record| record.first_attempt.elapsed() < self.retention);
    }

    /// Forget the record for one address (e.g. after an operator unblock).
    pub fn clear(&self, ip: IpAddr) {
        self.failures.remove(&normalize_ip(ip));
    }

    /// Current failure count for an address, if a record exists.
    pub fn failure_count(&self, ip: IpAddr) -> Option<u32> {
        self.failures.get(&normalize_ip(ip)).map(|r| r.count)
    }

    /// Number of addresses currently carrying a failure record.
    pub fn tracked_count(&self) -> usize {
        self.failures.len()
    }
}
