//! Address filtering against CIDR allow-ranges and a dynamic block set.
//!
//! SECURITY: This filter fails closed. An address that cannot be parsed,
//! falls outside every configured range, or sits in the block set is
//! rejected before any credential state is touched.

use std::net::IpAddr;

use dashmap::DashSet;
use ipnet::IpNet;

/// Map IPv4-mapped IPv6 addresses back to IPv4 so `::ffff:192.168.1.9`
/// matches a `192.168.0.0/16` allow-range.
pub(crate) fn normalize_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => ip,
        },
        IpAddr::V4(_) => ip,
    }
}

/// Parse allow-range entries as `IpNet` (supports both single IPs and CIDR ranges).
pub fn parse_networks(entries: &[String]) -> Vec<IpNet> {
    entries
        .iter()
        .filter_map(|s| {
            let s = s.trim();
            if let Ok(net) = s.parse::<IpNet>() {
                Some(net)
            } else if let Ok(ip) = s.parse::<IpAddr>() {
                Some(IpNet::from(ip))
            } else {
                None
            }
        })
        .collect()
}

/// Classifies client addresses as allowed or rejected.
///
/// The allow-ranges are fixed at construction; the block set is mutated at
/// runtime by the attempt tracker and by explicit operator action. Blocked
/// addresses stay blocked until [`AddressFilter::unblock`] is called.
pub struct AddressFilter {
    allowed: Vec<IpNet>,
    blocked: DashSet<IpAddr>,
}

impl AddressFilter {
    pub fn new(allowed: Vec<IpNet>) -> Self {
        Self {
            allowed,
            blocked: DashSet::new(),
        }
    }

    /// Check a raw client address. Unparseable input is rejected.
    pub fn is_allowed(&self, address: &str) -> bool {
        match address.parse::<IpAddr>() {
            Ok(ip) => self.is_allowed_ip(ip),
            Err(_) => false,
        }
    }

    /// Check a parsed client address: not blocked, and inside at least one
    /// configured range.
    pub fn is_allowed_ip(&self, ip: IpAddr) -> bool {
        let ip = normalize_ip(ip);
        if self.blocked.contains(&ip) {
            return false;
        }
        self.allowed.iter().any(|net| net.contains(&ip))
    }

    /// Add an address to the block set. Idempotent. Returns true if the
    /// address was not already blocked.
    pub fn block(&self, ip: IpAddr) -> bool {
        self.blocked.insert(normalize_ip(ip))
    }

    /// Remove an address from the block set. Idempotent.
    pub fn unblock(&self, ip: IpAddr) {
        self.blocked.remove(&normalize_ip(ip));
    }

    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.blocked.contains(&normalize_ip(ip))
    }

    /// Number of currently blocked addresses.
    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }
}
