use crate::components::{access_control, core, in_flight, license, resource};
use crate::config;
use crate::errors::ContractError;
use crate::events::{
    publish_overdue_resolved_event, publish_subscription_addresses_updated_event,
    publish_subscription_cancelled_event, publish_subscription_created_event,
    publish_subscription_paused_event, publish_subscription_resumed_event,
    publish_subscriptions_cleaned_up_event,
};
use crate::types::{
    CreateSubscriptionRequest, DataKey, Role, Subscription, SubscriptionFilter, SubscriptionStatus,
};
use soroban_sdk::{panic_with_error, Address, Env, String, Vec};

pub const MIN_ID_LEN: u32 = 4;
pub const MAX_ID_LEN: u32 = 64;
pub const MIN_CHAIN_ADDRESS_LEN: u32 = 32;
pub const MAX_CHAIN_ADDRESS_LEN: u32 = 44;
pub const MAX_PAGE_SIZE: u32 = 100;

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

// ── format checks ─────────────────────────────────────────────────────────────

fn with_ascii<F: Fn(&[u8]) -> bool>(value: &String, min: u32, max: u32, check: F) -> bool {
    let len = value.len();
    if len < min || len > max {
        return false;
    }
    let mut buf = [0u8; MAX_ID_LEN as usize];
    let slice = &mut buf[..len as usize];
    value.copy_into_slice(slice);
    check(slice)
}

/// 4..=64 characters of `[A-Za-z0-9_-]`.
pub fn is_valid_subscription_id(id: &String) -> bool {
    with_ascii(id, MIN_ID_LEN, MAX_ID_LEN, |bytes| {
        bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
    })
}

/// Base58 string of 32..=44 characters (destination-chain public key).
pub fn is_valid_chain_address(address: &String) -> bool {
    with_ascii(address, MIN_CHAIN_ADDRESS_LEN, MAX_CHAIN_ADDRESS_LEN, |bytes| {
        bytes.iter().all(|b| BASE58_ALPHABET.contains(b))
    })
}

// ── storage helpers ───────────────────────────────────────────────────────────

pub fn ids(env: &Env) -> Vec<String> {
    env.storage()
        .persistent()
        .get(&DataKey::SubscriptionIds)
        .unwrap_or_else(|| Vec::new(env))
}

fn store_ids(env: &Env, ids: &Vec<String>) {
    env.storage().persistent().set(&DataKey::SubscriptionIds, ids);
    core::bump_persistent(env, &DataKey::SubscriptionIds);
}

pub fn find(env: &Env, id: &String) -> Option<Subscription> {
    env.storage()
        .persistent()
        .get(&DataKey::Subscription(id.clone()))
}

pub fn load(env: &Env, id: &String) -> Subscription {
    find(env, id).unwrap_or_else(|| panic_with_error!(env, ContractError::SubscriptionNotFound))
}

pub fn save(env: &Env, subscription: &Subscription) {
    let key = DataKey::Subscription(subscription.id.clone());
    env.storage().persistent().set(&key, subscription);
    core::bump_persistent(env, &key);
}

/// Moves a record into a terminal state and releases its license slot.
pub fn finalize(env: &Env, subscription: &mut Subscription, status: SubscriptionStatus, now: u64) {
    subscription.status = status;
    subscription.terminal_at = Some(now);
    subscription.retry_at = None;
    license::decrement_active(env, &subscription.license_id);
}

fn is_admin(env: &Env, caller: &Address) -> bool {
    access_control::has_role(env, caller, Role::Admin)
}

fn require_owner_or_admin(env: &Env, caller: &Address, subscription: &Subscription) {
    caller.require_auth();
    if *caller != subscription.owner && !is_admin(env, caller) {
        panic_with_error!(env, ContractError::NotAuthorized);
    }
}

// ── create ────────────────────────────────────────────────────────────────────

/// Registers a subscription under a license.
///
/// Every check runs before the first write, in this order: emergency halt,
/// resource status, id format, address formats, amount, interval, license and
/// rate window, tier cap, global cap, duplicate id.
pub fn create(env: &Env, caller: &Address, request: &CreateSubscriptionRequest) -> String {
    caller.require_auth();
    core::assert_not_halted(env);
    resource::assert_accepting_subscriptions(env);

    let config = config::load(env);
    let now = env.ledger().timestamp();

    if !is_valid_subscription_id(&request.subscription_id) {
        panic_with_error!(env, ContractError::InvalidSubscriptionId);
    }
    for address in [
        &request.destination_program,
        &request.subscriber,
        &request.merchant,
        &request.token_mint,
    ] {
        if !is_valid_chain_address(address) {
            panic_with_error!(env, ContractError::InvalidAddress);
        }
    }
    if request.amount < config.min_amount || request.amount > config.max_amount {
        panic_with_error!(env, ContractError::InvalidAmount);
    }
    if request.interval_seconds != 0
        && (request.interval_seconds < config.min_interval_secs
            || request.interval_seconds > config.max_interval_secs)
    {
        panic_with_error!(env, ContractError::InvalidInterval);
    }
    if let Some(start) = request.start_time {
        if start > now.saturating_add(config.max_interval_secs) {
            panic_with_error!(env, ContractError::InvalidStartTime);
        }
    }

    let license_record = license::check(env, &request.api_key);
    if let Some(cap) = license::max_subscriptions(license_record.tier) {
        if license::active_count(env, &license_record.license_id) >= cap {
            panic_with_error!(env, ContractError::QuotaExceeded);
        }
    }

    let mut index = ids(env);
    if index.len() >= config.max_total_subscriptions {
        panic_with_error!(env, ContractError::CapacityReached);
    }
    let position = match index.binary_search(&request.subscription_id) {
        Ok(_) => panic_with_error!(env, ContractError::DuplicateSubscription),
        Err(position) => position,
    };

    let next_execution = request.start_time.map_or(now, |start| start.max(now));
    let subscription = Subscription {
        id: request.subscription_id.clone(),
        owner: caller.clone(),
        license_id: license_record.license_id.clone(),
        destination_program: request.destination_program.clone(),
        subscriber: request.subscriber.clone(),
        merchant: request.merchant.clone(),
        token_mint: request.token_mint.clone(),
        amount: request.amount,
        interval_seconds: request.interval_seconds,
        start_time: request.start_time,
        next_execution,
        retry_at: None,
        status: SubscriptionStatus::Active,
        created_at: now,
        trigger_count: 0,
        failed_payment_count: 0,
        consecutive_failures: 0,
        last_triggered: None,
        last_failure_time: None,
        last_error: None,
        last_rejection: None,
        overdue: false,
        paused_by_emergency: false,
        terminal_at: None,
    };

    save(env, &subscription);
    index.insert(position, subscription.id.clone());
    store_ids(env, &index);
    license::increment_active(env, &license_record.license_id);
    license::commit(env, &license_record);

    publish_subscription_created_event(
        env,
        subscription.id.clone(),
        caller.clone(),
        subscription.license_id,
        subscription.amount,
        subscription.interval_seconds,
        next_execution,
        now,
    );

    subscription.id
}

// ── reads ─────────────────────────────────────────────────────────────────────

pub fn get(env: &Env, id: &String) -> Option<Subscription> {
    find(env, id)
}

fn matches(subscription: &Subscription, filter: &SubscriptionFilter) -> bool {
    if let Some(status) = filter.status {
        if subscription.status as u32 != status {
            return false;
        }
    }
    if let Some(merchant) = &filter.merchant {
        if subscription.merchant != *merchant {
            return false;
        }
    }
    if let Some(subscriber) = &filter.subscriber {
        if subscription.subscriber != *subscriber {
            return false;
        }
    }
    if let Some(license_id) = &filter.license_id {
        if subscription.license_id != *license_id {
            return false;
        }
    }
    !filter.overdue_only || subscription.overdue
}

/// Matching records in id order. `start` skips that many matches; `limit` is
/// capped at [`MAX_PAGE_SIZE`].
pub fn list(env: &Env, filter: &SubscriptionFilter, start: u32, limit: u32) -> Vec<Subscription> {
    let limit = limit.min(MAX_PAGE_SIZE);
    let mut result = Vec::new(env);
    let mut skipped = 0u32;
    for id in ids(env).iter() {
        if result.len() >= limit {
            break;
        }
        let Some(subscription) = find(env, &id) else {
            continue;
        };
        if !matches(&subscription, filter) {
            continue;
        }
        if skipped < start {
            skipped += 1;
            continue;
        }
        result.push_back(subscription);
    }
    result
}

/// Gated read: counts one request against the caller's license and lists the
/// subscriptions created under it.
pub fn list_for_license(env: &Env, api_key: &String, start: u32, limit: u32) -> Vec<Subscription> {
    let record = license::consume(env, api_key);
    let filter = SubscriptionFilter {
        status: None,
        merchant: None,
        subscriber: None,
        license_id: Some(record.license_id),
        overdue_only: false,
    };
    list(env, &filter, start, limit)
}

pub fn get_overdue(env: &Env) -> Vec<String> {
    let mut overdue = Vec::new(env);
    for id in ids(env).iter() {
        if let Some(subscription) = find(env, &id) {
            if subscription.overdue && subscription.status == SubscriptionStatus::Active {
                overdue.push_back(id);
            }
        }
    }
    overdue
}

// ── lifecycle transitions ─────────────────────────────────────────────────────

pub fn pause(env: &Env, caller: &Address, id: &String) {
    let mut subscription = load(env, id);
    require_owner_or_admin(env, caller, &subscription);
    if subscription.status != SubscriptionStatus::Active {
        panic_with_error!(env, ContractError::InvalidState);
    }
    subscription.status = SubscriptionStatus::Paused;
    save(env, &subscription);

    publish_subscription_paused_event(env, id.clone(), caller.clone(), env.ledger().timestamp());
}

/// Reactivates a paused subscription. The schedule is kept as it was, so
/// `next_execution` never moves backwards.
pub fn resume(env: &Env, caller: &Address, id: &String) {
    let mut subscription = load(env, id);
    require_owner_or_admin(env, caller, &subscription);
    core::assert_not_halted(env);
    if subscription.status != SubscriptionStatus::Paused {
        panic_with_error!(env, ContractError::InvalidState);
    }
    subscription.status = SubscriptionStatus::Active;
    subscription.paused_by_emergency = false;
    save(env, &subscription);

    publish_subscription_resumed_event(env, id.clone(), caller.clone(), env.ledger().timestamp());
}

pub fn cancel(env: &Env, caller: &Address, id: &String) {
    let mut subscription = load(env, id);
    require_owner_or_admin(env, caller, &subscription);
    if subscription.status.is_terminal() {
        panic_with_error!(env, ContractError::InvalidState);
    }
    let now = env.ledger().timestamp();
    finalize(env, &mut subscription, SubscriptionStatus::Cancelled, now);
    save(env, &subscription);

    publish_subscription_cancelled_event(env, id.clone(), caller.clone(), now);
}

/// The owner or an admin may move the subscriber address; only an admin may
/// move the merchant address.
pub fn update_addresses(
    env: &Env,
    caller: &Address,
    id: &String,
    new_subscriber: &Option<String>,
    new_merchant: &Option<String>,
) {
    let mut subscription = load(env, id);
    require_owner_or_admin(env, caller, &subscription);
    if new_merchant.is_some() && !is_admin(env, caller) {
        panic_with_error!(env, ContractError::NotAuthorized);
    }
    if subscription.status.is_terminal() {
        panic_with_error!(env, ContractError::InvalidState);
    }
    if new_subscriber.is_none() && new_merchant.is_none() {
        panic_with_error!(env, ContractError::InvalidAddress);
    }

    if let Some(subscriber) = new_subscriber {
        if !is_valid_chain_address(subscriber) {
            panic_with_error!(env, ContractError::InvalidAddress);
        }
        subscription.subscriber = subscriber.clone();
    }
    if let Some(merchant) = new_merchant {
        if !is_valid_chain_address(merchant) {
            panic_with_error!(env, ContractError::InvalidAddress);
        }
        subscription.merchant = merchant.clone();
    }
    save(env, &subscription);

    publish_subscription_addresses_updated_event(
        env,
        id.clone(),
        subscription.subscriber,
        subscription.merchant,
        caller.clone(),
        env.ledger().timestamp(),
    );
}

/// Advances `next_execution` past `now` by whole periods. One-time
/// subscriptions have no next period and are left as they are.
pub fn advance_schedule(subscription: &mut Subscription, now: u64) {
    let interval = subscription.interval_seconds;
    if interval == 0 {
        return;
    }
    let periods = if subscription.next_execution > now {
        1
    } else {
        (now - subscription.next_execution) / interval + 1
    };
    subscription.next_execution = subscription
        .next_execution
        .saturating_add(periods.saturating_mul(interval));
}

/// Clears the overdue flag after the payment was collected by hand and moves
/// the schedule to the next period.
pub fn resolve_overdue(env: &Env, admin: &Address, id: &String) {
    access_control::require_admin(env, admin);
    let mut subscription = load(env, id);
    if !subscription.overdue || subscription.status.is_terminal() {
        panic_with_error!(env, ContractError::InvalidState);
    }
    let now = env.ledger().timestamp();
    subscription.overdue = false;
    subscription.consecutive_failures = 0;
    subscription.retry_at = None;
    if subscription.interval_seconds == 0 {
        finalize(env, &mut subscription, SubscriptionStatus::Expired, now);
    } else {
        advance_schedule(&mut subscription, now);
    }
    save(env, &subscription);

    publish_overdue_resolved_event(
        env,
        id.clone(),
        admin.clone(),
        subscription.next_execution,
        now,
    );
}

/// Deletes terminal records that reached their final state at least
/// `age_secs` ago. Returns the number removed.
pub fn cleanup_older_than(env: &Env, admin: &Address, age_secs: u64) -> u32 {
    access_control::require_admin(env, admin);
    let now = env.ledger().timestamp();
    let cutoff = now.saturating_sub(age_secs);

    let mut kept = Vec::new(env);
    let mut removed = 0u32;
    for id in ids(env).iter() {
        let stale = match find(env, &id) {
            Some(subscription) => subscription.terminal_at.is_some_and(|at| at <= cutoff),
            None => true,
        };
        if stale {
            env.storage()
                .persistent()
                .remove(&DataKey::Subscription(id.clone()));
            in_flight::release(env, &id);
            removed += 1;
        } else {
            kept.push_back(id);
        }
    }
    if removed > 0 {
        store_ids(env, &kept);
    }

    publish_subscriptions_cleaned_up_event(env, removed);
    removed
}

// ── emergency controls ────────────────────────────────────────────────────────

pub fn pause_all_for_emergency(env: &Env) -> u32 {
    let mut paused = 0u32;
    for id in ids(env).iter() {
        if let Some(mut subscription) = find(env, &id) {
            if subscription.status == SubscriptionStatus::Active {
                subscription.status = SubscriptionStatus::Paused;
                subscription.paused_by_emergency = true;
                save(env, &subscription);
                paused += 1;
            }
        }
    }
    paused
}

/// Reactivates only the subscriptions the emergency pause stopped.
pub fn resume_after_emergency(env: &Env) -> u32 {
    let mut resumed = 0u32;
    for id in ids(env).iter() {
        if let Some(mut subscription) = find(env, &id) {
            if subscription.status == SubscriptionStatus::Paused && subscription.paused_by_emergency
            {
                subscription.status = SubscriptionStatus::Active;
                subscription.paused_by_emergency = false;
                save(env, &subscription);
                resumed += 1;
            }
        }
    }
    resumed
}
