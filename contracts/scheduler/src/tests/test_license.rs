#![cfg(test)]

use super::mocks::{setup, DAY, START_TIME};
use crate::components::core::PERSISTENT_BUMP_AMOUNT;
use crate::components::license::{max_subscriptions, requests_per_window};
use crate::types::{DataKey, LicenseTier};
use soroban_sdk::testutils::storage::Persistent as _;
use soroban_sdk::String;

#[test]
fn test_register_and_inspect_license() {
    let ctx = setup();
    let info = ctx.client.get_license_info(&ctx.api_key);
    assert_eq!(info.tier, LicenseTier::Community);
    assert!(info.is_valid);
    assert_eq!(info.quota_remaining, 1_000);
    assert_eq!(info.max_subscriptions, Some(10));
    assert_eq!(info.active_subscriptions, 0);
    assert_eq!(info.expires_at, START_TIME + 365 * DAY);
}

#[test]
fn test_license_id_is_stable_hash_of_key() {
    let ctx = setup();
    let key = String::from_str(&ctx.env, "enterprise-key");
    let first = ctx
        .client
        .register_license(&ctx.admin, &key, &LicenseTier::Enterprise, &(START_TIME + DAY));
    let second = ctx
        .client
        .register_license(&ctx.admin, &key, &LicenseTier::Business, &(START_TIME + DAY));
    assert_eq!(first, second);
    assert_eq!(ctx.client.get_license_info(&key).tier, LicenseTier::Business);
}

#[test]
fn test_creation_consumes_quota_and_counts_active() {
    let ctx = setup();
    ctx.create_daily("sub-a");
    ctx.create_daily("sub-b");

    let info = ctx.client.get_license_info(&ctx.api_key);
    assert_eq!(info.quota_remaining, 998);
    assert_eq!(info.active_subscriptions, 2);
}

#[test]
fn test_active_count_entry_is_kept_alive() {
    let ctx = setup();
    ctx.create_daily("sub-a");
    let license_id = ctx.client.get_license_info(&ctx.api_key).license_id;

    ctx.env.as_contract(&ctx.client.address, || {
        let ttl = ctx
            .env
            .storage()
            .persistent()
            .get_ttl(&DataKey::LicenseActiveCount(license_id.clone()));
        assert_eq!(ttl, PERSISTENT_BUMP_AMOUNT);
    });
}

#[test]
fn test_tier_cap_returns_quota_exceeded_without_insert() {
    let ctx = setup();
    let ids = [
        "sub-00", "sub-01", "sub-02", "sub-03", "sub-04", "sub-05", "sub-06", "sub-07", "sub-08",
        "sub-09",
    ];
    for id in ids {
        ctx.create_daily(id);
    }

    let result = ctx
        .client
        .try_create_subscription(&ctx.owner, &ctx.request("sub-10", 500, DAY));
    assert!(result.is_err());
    assert!(ctx.client.get_subscription(&ctx.id("sub-10")).is_none());
    assert_eq!(ctx.client.get_license_info(&ctx.api_key).active_subscriptions, 10);
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #12)")]
fn test_tier_cap_error_code() {
    let ctx = setup();
    let ids = [
        "sub-00", "sub-01", "sub-02", "sub-03", "sub-04", "sub-05", "sub-06", "sub-07", "sub-08",
        "sub-09", "sub-10",
    ];
    for id in ids {
        ctx.create_daily(id);
    }
}

#[test]
fn test_cancelled_subscription_frees_tier_slot() {
    let ctx = setup();
    let ids = [
        "sub-00", "sub-01", "sub-02", "sub-03", "sub-04", "sub-05", "sub-06", "sub-07", "sub-08",
        "sub-09",
    ];
    for id in ids {
        ctx.create_daily(id);
    }
    ctx.client.cancel_subscription(&ctx.owner, &ctx.id("sub-03"));
    ctx.create_daily("sub-10");
    assert_eq!(ctx.client.get_license_info(&ctx.api_key).active_subscriptions, 10);
}

#[test]
fn test_rate_window_exhaustion_and_sliding_recovery() {
    let ctx = setup();
    for _ in 0..1_000 {
        ctx.client
            .list_subscriptions_for_license(&ctx.api_key, &0, &1);
    }
    assert_eq!(ctx.client.get_license_info(&ctx.api_key).quota_remaining, 0);

    let result = ctx
        .client
        .try_list_subscriptions_for_license(&ctx.api_key, &0, &1);
    assert!(result.is_err());
    let result = ctx
        .client
        .try_create_subscription(&ctx.owner, &ctx.request("sub-limited", 500, DAY));
    assert!(result.is_err());
    assert!(ctx.client.get_subscription(&ctx.id("sub-limited")).is_none());

    // the full previous window still weighs on the start of the next one
    ctx.advance(DAY);
    assert!(ctx
        .client
        .try_list_subscriptions_for_license(&ctx.api_key, &0, &1)
        .is_err());

    // half-way through, half of the previous usage remains
    ctx.advance(DAY / 2);
    assert_eq!(ctx.client.get_license_info(&ctx.api_key).quota_remaining, 500);
    ctx.client.tick(&ctx.keeper);
    ctx.create_daily("sub-after");
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #11)")]
fn test_rate_limited_error_code() {
    let ctx = setup();
    for _ in 0..1_001 {
        ctx.client
            .list_subscriptions_for_license(&ctx.api_key, &0, &1);
    }
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #1)")]
fn test_revoked_license_rejected() {
    let ctx = setup();
    ctx.client.revoke_license(&ctx.admin, &ctx.api_key);
    assert!(!ctx.client.get_license_info(&ctx.api_key).is_valid);
    ctx.create_daily("sub-a");
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #21)")]
fn test_expired_license_rejected() {
    let ctx = setup();
    ctx.advance(366 * DAY);
    ctx.client.tick(&ctx.keeper);
    ctx.create_daily("sub-a");
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #20)")]
fn test_unknown_license_info() {
    let ctx = setup();
    ctx.client
        .get_license_info(&String::from_str(&ctx.env, "nobody"));
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #1)")]
fn test_only_admin_registers_licenses() {
    let ctx = setup();
    ctx.client.register_license(
        &ctx.owner,
        &String::from_str(&ctx.env, "self-issued"),
        &LicenseTier::Enterprise,
        &(START_TIME + DAY),
    );
}

#[test]
fn test_tier_limits() {
    assert_eq!(requests_per_window(LicenseTier::Community), 1_000);
    assert_eq!(requests_per_window(LicenseTier::Beta), 10_000);
    assert_eq!(requests_per_window(LicenseTier::Business), 50_000);
    assert_eq!(requests_per_window(LicenseTier::Enterprise), 100_000);
    assert_eq!(max_subscriptions(LicenseTier::Business), Some(1_000));
    assert_eq!(max_subscriptions(LicenseTier::Enterprise), None);
}
