use crate::components::{access_control, core};
use crate::config;
use crate::errors::ContractError;
use crate::events::{publish_credits_low_event, publish_credits_refilled_event};
use crate::types::{
    DataKey, DegradationReason, HealthStatus, ResourceLedger, ResourceReport, SchedulerConfig,
};
use soroban_sdk::{log, panic_with_error, Address, Env};

const BPS_DENOMINATOR: u64 = 10_000;

impl HealthStatus {
    /// No new work may start in this state.
    pub fn blocks_operations(self) -> bool {
        matches!(self, HealthStatus::Critical | HealthStatus::Offline)
    }
}

pub fn load_ledger(env: &Env) -> ResourceLedger {
    env.storage()
        .instance()
        .get(&DataKey::ResourceLedger)
        .unwrap_or_else(|| panic_with_error!(env, ContractError::NotInitialized))
}

pub fn store_ledger(env: &Env, ledger: &ResourceLedger) {
    env.storage().instance().set(&DataKey::ResourceLedger, ledger);
}

/// Classification from the credit balance alone.
pub fn balance_status(ledger: &ResourceLedger) -> (HealthStatus, Option<DegradationReason>) {
    if ledger.current_balance == 0 {
        (HealthStatus::Offline, Some(DegradationReason::CreditsExhausted))
    } else if ledger.current_balance < ledger.threshold_balance / 4 {
        (HealthStatus::Critical, Some(DegradationReason::LowCredits))
    } else if ledger.current_balance < ledger.threshold_balance {
        (HealthStatus::Degraded, Some(DegradationReason::LowCredits))
    } else {
        (HealthStatus::Healthy, None)
    }
}

/// Classification from tick liveness. Before the first tick the scheduler's
/// start time is the reference point.
pub fn liveness_status(
    ledger: &ResourceLedger,
    config: &SchedulerConfig,
    started_at: u64,
    now: u64,
) -> (HealthStatus, Option<DegradationReason>) {
    let (reference, reason) = match ledger.last_tick_at {
        Some(at) => (at, DegradationReason::StaleTick),
        None => (started_at, DegradationReason::NoTickYet),
    };
    let idle = now.saturating_sub(reference);
    if idle >= config.offline_after_secs {
        (HealthStatus::Offline, Some(reason))
    } else if idle >= config.degraded_after_secs {
        (HealthStatus::Degraded, Some(reason))
    } else {
        (HealthStatus::Healthy, None)
    }
}

pub fn classify(
    env: &Env,
    ledger: &ResourceLedger,
    config: &SchedulerConfig,
) -> (HealthStatus, Option<DegradationReason>) {
    let started_at = core::load_stats(env).started_at;
    let balance = balance_status(ledger);
    let liveness = liveness_status(ledger, config, started_at, env.ledger().timestamp());
    if (liveness.0 as u32) > (balance.0 as u32) {
        liveness
    } else {
        balance
    }
}

pub fn current_balance_status(env: &Env) -> HealthStatus {
    balance_status(&load_ledger(env)).0
}

/// Gate for payment work. Balance only; tick liveness is ignored.
pub fn assert_can_start_work(env: &Env) {
    if current_balance_status(env).blocks_operations() {
        panic_with_error!(env, ContractError::ResourceExhausted);
    }
}

/// Gate for new subscriptions: balance and tick liveness combined.
pub fn assert_accepting_subscriptions(env: &Env) {
    let (status, _) = classify(env, &load_ledger(env), &config::load(env));
    if status.blocks_operations() {
        panic_with_error!(env, ContractError::ResourceExhausted);
    }
}

/// Deducts up to `amount` credits. The balance never goes below zero.
pub fn charge(env: &Env, amount: u64) {
    let mut ledger = load_ledger(env);
    let taken = amount.min(ledger.current_balance);
    ledger.current_balance -= taken;
    ledger.total_consumed = ledger.total_consumed.saturating_add(taken);
    store_ledger(env, &ledger);
}

/// Credits the configured share of one trigger fee to the fee pool.
pub fn credit_trigger_fee(env: &Env, config: &SchedulerConfig) {
    let mut ledger = load_ledger(env);
    let share = config
        .trigger_fee
        .saturating_mul(config.refill_ratio_bps as u64)
        / BPS_DENOMINATOR;
    ledger.fee_pool = ledger.fee_pool.saturating_add(share);
    store_ledger(env, &ledger);
}

fn move_fee_pool(env: &Env, ledger: &mut ResourceLedger) -> u64 {
    let amount = ledger.fee_pool;
    if amount == 0 {
        return 0;
    }
    let now = env.ledger().timestamp();
    ledger.fee_pool = 0;
    ledger.current_balance = ledger.current_balance.saturating_add(amount);
    ledger.total_refilled = ledger.total_refilled.saturating_add(amount);
    ledger.last_refill = Some(now);
    publish_credits_refilled_event(env, amount, true, ledger.current_balance, now);
    amount
}

/// Tops the balance up from the fee pool when it has fallen below the
/// threshold and auto-refill is on. Returns the resulting balance status.
pub fn auto_refill(env: &Env) -> HealthStatus {
    let mut ledger = load_ledger(env);
    if ledger.auto_refill_enabled && ledger.current_balance < ledger.threshold_balance {
        let moved = move_fee_pool(env, &mut ledger);
        if moved > 0 {
            log!(env, "auto-refill moved {} credits", moved);
            store_ledger(env, &ledger);
        }
    }

    let (status, _) = balance_status(&ledger);
    if status != HealthStatus::Healthy {
        publish_credits_low_event(
            env,
            ledger.current_balance,
            ledger.threshold_balance,
            status as u32,
        );
    }
    status
}

pub fn mark_tick(env: &Env, now: u64) {
    let mut ledger = load_ledger(env);
    ledger.last_tick_at = Some(now);
    store_ledger(env, &ledger);
}

pub fn refill_credits(env: &Env, admin: &Address, amount: u64) {
    access_control::require_admin(env, admin);
    if amount == 0 {
        panic_with_error!(env, ContractError::InvalidAmount);
    }
    let now = env.ledger().timestamp();
    let mut ledger = load_ledger(env);
    ledger.current_balance = ledger.current_balance.saturating_add(amount);
    ledger.total_refilled = ledger.total_refilled.saturating_add(amount);
    ledger.last_refill = Some(now);
    store_ledger(env, &ledger);

    publish_credits_refilled_event(env, amount, false, ledger.current_balance, now);
}

pub fn refill_from_fees(env: &Env, admin: &Address) -> u64 {
    access_control::require_admin(env, admin);
    let mut ledger = load_ledger(env);
    let moved = move_fee_pool(env, &mut ledger);
    store_ledger(env, &ledger);
    moved
}

pub fn set_credit_threshold(env: &Env, admin: &Address, threshold: u64) {
    access_control::require_admin(env, admin);
    let mut ledger = load_ledger(env);
    ledger.threshold_balance = threshold;
    store_ledger(env, &ledger);
}

pub fn set_auto_refill(env: &Env, admin: &Address, enabled: bool) {
    access_control::require_admin(env, admin);
    let mut ledger = load_ledger(env);
    ledger.auto_refill_enabled = enabled;
    store_ledger(env, &ledger);
}

pub fn get_cycle_status(env: &Env) -> ResourceReport {
    let ledger = load_ledger(env);
    let (classification, _) = classify(env, &ledger, &config::load(env));
    ResourceReport {
        current_balance: ledger.current_balance,
        threshold_balance: ledger.threshold_balance,
        auto_refill_enabled: ledger.auto_refill_enabled,
        total_consumed: ledger.total_consumed,
        total_refilled: ledger.total_refilled,
        last_refill: ledger.last_refill,
        fee_pool: ledger.fee_pool,
        classification,
    }
}
