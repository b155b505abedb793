//! API-key licenses: tier limits, expiry and the sliding-window request
//! counter. Records are keyed by the sha256 of the key so the raw key is
//! never stored.

use crate::components::{access_control, core};
use crate::config;
use crate::errors::ContractError;
use crate::events::{publish_license_registered_event, publish_license_revoked_event};
use crate::types::{DataKey, LicenseRecord, LicenseTier, LicenseValidation};
use soroban_sdk::xdr::ToXdr;
use soroban_sdk::{panic_with_error, Address, BytesN, Env, String};

pub fn requests_per_window(tier: LicenseTier) -> u32 {
    match tier {
        LicenseTier::Community => 1_000,
        LicenseTier::Beta => 10_000,
        LicenseTier::Business => 50_000,
        LicenseTier::Enterprise => 100_000,
    }
}

/// `None` means only the global registry cap applies.
pub fn max_subscriptions(tier: LicenseTier) -> Option<u32> {
    match tier {
        LicenseTier::Community => Some(10),
        LicenseTier::Beta => Some(100),
        LicenseTier::Business => Some(1_000),
        LicenseTier::Enterprise => None,
    }
}

pub fn license_id(env: &Env, api_key: &String) -> BytesN<32> {
    env.crypto().sha256(&api_key.clone().to_xdr(env)).to_bytes()
}

fn load(env: &Env, license_id: &BytesN<32>) -> Option<LicenseRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::License(license_id.clone()))
}

fn store(env: &Env, record: &LicenseRecord) {
    let key = DataKey::License(record.license_id.clone());
    env.storage().persistent().set(&key, record);
    core::bump_persistent(env, &key);
}

/// Moves the window forward to the one containing `now`. The previous
/// bucket survives only when the windows are adjacent.
fn roll_window(record: &mut LicenseRecord, now: u64, window: u64) {
    if now < record.window_start.saturating_add(window) {
        return;
    }
    let elapsed_windows = (now - record.window_start) / window;
    record.previous_window_count = if elapsed_windows == 1 {
        record.window_count
    } else {
        0
    };
    record.window_count = 0;
    record.window_start += elapsed_windows * window;
}

/// Previous bucket weighted by its overlap with the trailing window, plus the
/// current bucket.
fn estimated_usage(record: &LicenseRecord, now: u64, window: u64) -> u32 {
    let into_window = now.saturating_sub(record.window_start).min(window);
    let carried = (record.previous_window_count as u64) * (window - into_window) / window;
    (carried as u32).saturating_add(record.window_count)
}

pub fn active_count(env: &Env, license_id: &BytesN<32>) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::LicenseActiveCount(license_id.clone()))
        .unwrap_or(0)
}

fn store_active_count(env: &Env, license_id: &BytesN<32>, count: u32) {
    let key = DataKey::LicenseActiveCount(license_id.clone());
    env.storage().persistent().set(&key, &count);
    core::bump_persistent(env, &key);
}

pub fn increment_active(env: &Env, license_id: &BytesN<32>) {
    store_active_count(env, license_id, active_count(env, license_id).saturating_add(1));
}

pub fn decrement_active(env: &Env, license_id: &BytesN<32>) {
    store_active_count(env, license_id, active_count(env, license_id).saturating_sub(1));
}

/// Validates a key for one request and returns the record with the request
/// already counted. Nothing is written; the caller persists it with
/// [`commit`] once every other check has passed.
pub fn check(env: &Env, api_key: &String) -> LicenseRecord {
    let id = license_id(env, api_key);
    let mut record =
        load(env, &id).unwrap_or_else(|| panic_with_error!(env, ContractError::LicenseNotFound));

    if record.revoked {
        panic_with_error!(env, ContractError::NotAuthorized);
    }
    let now = env.ledger().timestamp();
    if now >= record.expires_at {
        panic_with_error!(env, ContractError::LicenseExpired);
    }

    let window = config::load(env).license_window_secs;
    roll_window(&mut record, now, window);
    if estimated_usage(&record, now, window) >= requests_per_window(record.tier) {
        panic_with_error!(env, ContractError::RateLimited);
    }
    record.window_count = record.window_count.saturating_add(1);
    record
}

pub fn commit(env: &Env, record: &LicenseRecord) {
    store(env, record);
}

/// Validates and counts one request in a single step.
pub fn consume(env: &Env, api_key: &String) -> LicenseRecord {
    let record = check(env, api_key);
    commit(env, &record);
    record
}

pub fn register_license(
    env: &Env,
    admin: &Address,
    api_key: &String,
    tier: LicenseTier,
    expires_at: u64,
) -> BytesN<32> {
    access_control::require_admin(env, admin);
    let now = env.ledger().timestamp();
    if expires_at <= now {
        panic_with_error!(env, ContractError::LicenseExpired);
    }

    let id = license_id(env, api_key);
    let record = match load(env, &id) {
        Some(mut existing) => {
            existing.tier = tier;
            existing.expires_at = expires_at;
            existing.revoked = false;
            existing
        }
        None => LicenseRecord {
            license_id: id.clone(),
            tier,
            expires_at,
            revoked: false,
            created_at: now,
            window_start: now,
            window_count: 0,
            previous_window_count: 0,
        },
    };
    store(env, &record);

    publish_license_registered_event(env, id.clone(), tier as u32, expires_at, now);
    id
}

pub fn revoke_license(env: &Env, admin: &Address, api_key: &String) {
    access_control::require_admin(env, admin);
    let id = license_id(env, api_key);
    let mut record =
        load(env, &id).unwrap_or_else(|| panic_with_error!(env, ContractError::LicenseNotFound));
    record.revoked = true;
    store(env, &record);

    publish_license_revoked_event(env, id, env.ledger().timestamp());
}

pub fn get_license_info(env: &Env, api_key: &String) -> LicenseValidation {
    let id = license_id(env, api_key);
    let mut record =
        load(env, &id).unwrap_or_else(|| panic_with_error!(env, ContractError::LicenseNotFound));

    let now = env.ledger().timestamp();
    let window = config::load(env).license_window_secs;
    roll_window(&mut record, now, window);
    let used = estimated_usage(&record, now, window);

    LicenseValidation {
        license_id: id.clone(),
        tier: record.tier,
        is_valid: !record.revoked && now < record.expires_at,
        quota_remaining: requests_per_window(record.tier).saturating_sub(used),
        max_subscriptions: max_subscriptions(record.tier),
        active_subscriptions: active_count(env, &id),
        expires_at: record.expires_at,
    }
}
