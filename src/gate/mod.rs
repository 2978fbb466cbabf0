//! Access control for the gateway.
//!
//! The request layer talks to [`Gateway::authenticate`] only; the address
//! filter and attempt tracker are composed behind it. Administrative
//! operations (key issuance, revocation, rotation, block/unblock) are
//! exposed for the operator interface.

mod attempts;
mod facade;
mod filter;

pub use attempts::AttemptTracker;
pub use facade::{AuthError, CredentialKind, DeviceIdentity, Gateway};
pub use filter::{parse_networks, AddressFilter};
