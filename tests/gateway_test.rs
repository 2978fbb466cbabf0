//! End-to-end facade tests: the request-layer contract.

use std::net::IpAddr;
use std::time::Duration;

use warden_core::{AuthError, CredentialKind, Gateway, GatewayConfig};

const IN_RANGE: &str = "192.168.1.9";

fn gateway() -> Gateway {
    Gateway::new(GatewayConfig::default())
}

#[test]
fn issue_verify_rotate_scenario() {
    let gw = gateway();

    let k1 = gw.issue_key("glasses-01").unwrap();
    let identity = gw.authenticate(IN_RANGE, &k1).unwrap();
    assert_eq!(identity.device_id, "glasses-01");
    assert_eq!(identity.method, CredentialKind::ApiKey);
    assert!(gw.devices()[0].last_used.is_some());

    let rotated = gw.rotate_all_keys();
    assert!(matches!(
        gw.authenticate(IN_RANGE, &k1),
        Err(AuthError::InvalidCredential)
    ));
    let identity = gw.authenticate(IN_RANGE, &rotated[0].api_key).unwrap();
    assert_eq!(identity.device_id, "glasses-01");
}

#[test]
fn token_credential_authenticates() {
    let gw = gateway();
    let token = gw.issue_token("glasses-01").unwrap();

    let identity = gw.authenticate(IN_RANGE, &token).unwrap();
    assert_eq!(identity.device_id, "glasses-01");
    assert_eq!(identity.method, CredentialKind::SessionToken);
}

#[test]
fn expired_token_reports_expired() {
    let gw = gateway();
    let token = gw
        .issue_token_with_ttl("glasses-01", Duration::ZERO)
        .unwrap();
    assert!(matches!(
        gw.authenticate(IN_RANGE, &token),
        Err(AuthError::Expired)
    ));
}

#[test]
fn secret_rotation_invalidates_tokens() {
    let gw = gateway();
    let token = gw.issue_token("glasses-01").unwrap();

    gw.rotate_token_secret();
    assert!(matches!(
        gw.authenticate(IN_RANGE, &token),
        Err(AuthError::InvalidSignature)
    ));
}

#[test]
fn fifth_failure_blocks_the_address() {
    let gw = gateway();
    let key = gw.issue_key("glasses-01").unwrap();
    let addr = "192.168.1.50";
    let ip: IpAddr = addr.parse().unwrap();

    for _ in 0..4 {
        let _ = gw.authenticate(addr, "wrong-key");
        assert!(!gw.is_blocked(ip));
    }
    let _ = gw.authenticate(addr, "wrong-key");
    assert!(gw.is_blocked(ip));

    // Blocked beats a perfectly valid credential.
    assert!(matches!(
        gw.authenticate(addr, &key),
        Err(AuthError::AddressBlocked)
    ));
}

#[test]
fn out_of_range_address_rejected_before_credentials() {
    let gw = gateway();
    let key = gw.issue_key("glasses-01").unwrap();

    assert!(matches!(
        gw.authenticate("10.0.0.7", &key),
        Err(AuthError::AddressBlocked)
    ));
    // The knocking is still recorded and eventually escalates to an
    // explicit block.
    for _ in 0..4 {
        let _ = gw.authenticate("10.0.0.7", &key);
    }
    let ip: IpAddr = "10.0.0.7".parse().unwrap();
    assert!(gw.is_blocked(ip));
    assert_eq!(gw.failure_count(ip), Some(5));
}

#[test]
fn unparseable_address_rejected() {
    let gw = gateway();
    let key = gw.issue_key("glasses-01").unwrap();

    for bad in ["", "localhost", "999.1.2.3", "192.168.1"] {
        assert!(matches!(
            gw.authenticate(bad, &key),
            Err(AuthError::AddressBlocked)
        ));
    }
}

#[test]
fn unblock_restores_access_and_resets_the_count() {
    let gw = gateway();
    let key = gw.issue_key("glasses-01").unwrap();
    let addr = "192.168.1.51";
    let ip: IpAddr = addr.parse().unwrap();

    for _ in 0..5 {
        let _ = gw.authenticate(addr, "wrong-key");
    }
    assert!(gw.is_blocked(ip));

    gw.unblock(ip);
    assert!(!gw.is_blocked(ip));
    assert_eq!(gw.failure_count(ip), None);

    // One more failure starts a fresh count instead of re-blocking.
    let _ = gw.authenticate(addr, "wrong-key");
    assert!(!gw.is_blocked(ip));
    assert_eq!(gw.failure_count(ip), Some(1));

    let identity = gw.authenticate(addr, &key).unwrap();
    assert_eq!(identity.device_id, "glasses-01");
}

#[test]
fn operator_block_rejects_valid_credentials() {
    let gw = gateway();
    let key = gw.issue_key("glasses-01").unwrap();
    let ip: IpAddr = IN_RANGE.parse().unwrap();

    gw.block(ip);
    assert!(matches!(
        gw.authenticate(IN_RANGE, &key),
        Err(AuthError::AddressBlocked)
    ));
}

#[test]
fn revoked_device_fails_closed() {
    let gw = gateway();
    let key = gw.issue_key("glasses-01").unwrap();

    gw.revoke_device("glasses-01");
    assert!(matches!(
        gw.authenticate(IN_RANGE, &key),
        Err(AuthError::InvalidCredential)
    ));
    assert_eq!(gw.device_count(), 0);
}

#[test]
fn rotate_credentials_invalidates_keys_and_tokens_together() {
    let gw = gateway();
    let key = gw.issue_key("glasses-01").unwrap();
    let token = gw.issue_token("glasses-01").unwrap();

    let rotated = gw.rotate_credentials();

    assert!(gw.authenticate(IN_RANGE, &key).is_err());
    assert!(gw.authenticate(IN_RANGE, &token).is_err());
    assert!(gw.authenticate(IN_RANGE, &rotated[0].api_key).is_ok());
}

#[test]
fn cleanup_forgets_stale_failures_before_threshold() {
    let gw = Gateway::new(GatewayConfig {
        failure_retention: Duration::from_millis(1),
        ..GatewayConfig::default()
    });
    let addr = "192.168.1.52";
    let ip: IpAddr = addr.parse().unwrap();

    for _ in 0..4 {
        let _ = gw.authenticate(addr, "wrong-key");
    }
    std::thread::sleep(Duration::from_millis(10));
    gw.cleanup();
    assert_eq!(gw.failure_count(ip), None);

    // The slate is clean; four more failures still stay under the threshold.
    for _ in 0..4 {
        let _ = gw.authenticate(addr, "wrong-key");
    }
    assert!(!gw.is_blocked(ip));
}
