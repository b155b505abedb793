use crate::components::{access_control, registry, resource, settlement, signing};
use crate::config;
use crate::errors::ContractError;
use crate::events::publish_initialized_event;
use crate::types::{DataKey, ResourceLedger, Role, SchedulerConfig, SchedulerStats};
use soroban_sdk::{panic_with_error, Address, Env, String};

pub const INSTANCE_LIFETIME_THRESHOLD: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 86_400;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = 120_960;
pub const PERSISTENT_BUMP_AMOUNT: u32 = 1_051_200;

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Initialized)
}

pub fn assert_initialized(env: &Env) {
    if !is_initialized(env) {
        panic_with_error!(env, ContractError::NotInitialized);
    }
}

pub fn initialize(
    env: &Env,
    admin: &Address,
    fee_address: &String,
    signing_service: &Address,
    settlement_gateway: &Address,
    initial_credits: u64,
) {
    if is_initialized(env) {
        panic_with_error!(env, ContractError::AlreadyInitialized);
    }
    admin.require_auth();

    if !registry::is_valid_chain_address(fee_address) {
        panic_with_error!(env, ContractError::InvalidAddress);
    }

    let now = env.ledger().timestamp();
    env.storage().instance().set(&DataKey::Initialized, &true);
    config::store(env, &SchedulerConfig::default());

    access_control::grant_role(env, admin, Role::Admin);
    access_control::grant_role(env, admin, Role::ControllerAdmin);

    env.storage()
        .instance()
        .set(&DataKey::FeeAddress, fee_address);

    resource::store_ledger(
        env,
        &ResourceLedger {
            current_balance: initial_credits,
            threshold_balance: config::DEFAULT_CREDIT_THRESHOLD,
            auto_refill_enabled: true,
            total_consumed: 0,
            total_refilled: 0,
            last_refill: None,
            fee_pool: 0,
            last_tick_at: None,
        },
    );

    store_stats(
        env,
        &SchedulerStats {
            started_at: now,
            total_ticks: 0,
            total_triggers: 0,
            total_failed_payments: 0,
            total_timeouts: 0,
        },
    );

    signing::configure(env, signing_service);
    settlement::configure(env, settlement_gateway);

    bump_instance(env);
    publish_initialized_event(env, admin.clone(), now);
}

pub fn load_stats(env: &Env) -> SchedulerStats {
    env.storage()
        .instance()
        .get(&DataKey::Stats)
        .unwrap_or_else(|| panic_with_error!(env, ContractError::NotInitialized))
}

pub fn store_stats(env: &Env, stats: &SchedulerStats) {
    env.storage().instance().set(&DataKey::Stats, stats);
}

pub fn is_halted(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::OperationsHalted)
        .unwrap_or(false)
}

pub fn assert_not_halted(env: &Env) {
    if is_halted(env) {
        panic_with_error!(env, ContractError::OperationsHalted);
    }
}

pub fn set_halted(env: &Env, halted: bool) {
    env.storage()
        .instance()
        .set(&DataKey::OperationsHalted, &halted);
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}
