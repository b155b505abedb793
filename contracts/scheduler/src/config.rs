use crate::errors::ContractError;
use crate::types::{DataKey, SchedulerConfig};
use soroban_sdk::{panic_with_error, Env};

pub const DEFAULT_MIN_AMOUNT: u64 = 1;
pub const DEFAULT_MAX_AMOUNT: u64 = 1_000_000_000_000;
pub const DEFAULT_MIN_INTERVAL_SECS: u64 = 3_600;
pub const DEFAULT_MAX_INTERVAL_SECS: u64 = 31_536_000;
pub const DEFAULT_MAX_TOTAL_SUBSCRIPTIONS: u32 = 10_000;
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_SECS: u64 = 300;
pub const DEFAULT_MAX_RETRY_DELAY_SECS: u64 = 86_400;
pub const DEFAULT_SUBMIT_ATTEMPTS: u32 = 2;
pub const DEFAULT_CONFIRMATION_TIMEOUT_TICKS: u32 = 3;
pub const DEFAULT_MAX_TRIGGERS_PER_TICK: u32 = 25;
pub const DEFAULT_SIGNATURE_VALIDITY_SECS: u64 = 30;
pub const DEFAULT_FEE_PROPOSAL_DELAY_SECS: u64 = 604_800;
pub const DEFAULT_TICK_COST: u64 = 10;
pub const DEFAULT_TRIGGER_COST: u64 = 100;
pub const DEFAULT_TRIGGER_FEE: u64 = 150;
pub const DEFAULT_REFILL_RATIO_BPS: u32 = 3_000;
pub const DEFAULT_DEGRADED_AFTER_SECS: u64 = 900;
pub const DEFAULT_OFFLINE_AFTER_SECS: u64 = 3_600;
pub const DEFAULT_LICENSE_WINDOW_SECS: u64 = 86_400;
pub const DEFAULT_CREDIT_THRESHOLD: u64 = 10_000;

const MAX_BPS: u32 = 10_000;

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_amount: DEFAULT_MIN_AMOUNT,
            max_amount: DEFAULT_MAX_AMOUNT,
            min_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
            max_interval_secs: DEFAULT_MAX_INTERVAL_SECS,
            max_total_subscriptions: DEFAULT_MAX_TOTAL_SUBSCRIPTIONS,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            retry_base_delay_secs: DEFAULT_RETRY_BASE_DELAY_SECS,
            max_retry_delay_secs: DEFAULT_MAX_RETRY_DELAY_SECS,
            submit_attempts: DEFAULT_SUBMIT_ATTEMPTS,
            confirmation_timeout_ticks: DEFAULT_CONFIRMATION_TIMEOUT_TICKS,
            max_triggers_per_tick: DEFAULT_MAX_TRIGGERS_PER_TICK,
            signature_validity_secs: DEFAULT_SIGNATURE_VALIDITY_SECS,
            fee_proposal_delay_secs: DEFAULT_FEE_PROPOSAL_DELAY_SECS,
            tick_cost: DEFAULT_TICK_COST,
            trigger_cost: DEFAULT_TRIGGER_COST,
            trigger_fee: DEFAULT_TRIGGER_FEE,
            refill_ratio_bps: DEFAULT_REFILL_RATIO_BPS,
            degraded_after_secs: DEFAULT_DEGRADED_AFTER_SECS,
            offline_after_secs: DEFAULT_OFFLINE_AFTER_SECS,
            license_window_secs: DEFAULT_LICENSE_WINDOW_SECS,
        }
    }
}

impl SchedulerConfig {
    /// Returns `false` for any combination the scheduler cannot run with.
    pub fn is_consistent(&self) -> bool {
        self.min_amount > 0
            && self.min_amount <= self.max_amount
            && self.min_interval_secs > 0
            && self.min_interval_secs <= self.max_interval_secs
            && self.max_total_subscriptions > 0
            && self.max_consecutive_failures > 0
            && self.retry_base_delay_secs <= self.max_retry_delay_secs
            && self.submit_attempts > 0
            && self.confirmation_timeout_ticks > 0
            && self.max_triggers_per_tick > 0
            && self.signature_validity_secs > 0
            && self.license_window_secs > 0
            && self.refill_ratio_bps <= MAX_BPS
            && self.degraded_after_secs < self.offline_after_secs
    }
}

pub fn validate(env: &Env, config: &SchedulerConfig) {
    if !config.is_consistent() {
        panic_with_error!(env, ContractError::InvalidConfig);
    }
}

pub fn load(env: &Env) -> SchedulerConfig {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, ContractError::NotInitialized))
}

pub fn store(env: &Env, config: &SchedulerConfig) {
    validate(env, config);
    env.storage().instance().set(&DataKey::Config, config);
}
