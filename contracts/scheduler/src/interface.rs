use crate::types::{
    CreateSubscriptionRequest, FeeGovernance, LicenseTier, LicenseValidation, ResourceReport,
    SchedulerConfig, SchedulerHealth, Subscription, SubscriptionFilter, TickReport,
    TriggerOutcome,
};
use soroban_sdk::{Address, BytesN, Env, String, Vec};

pub trait SchedulerTrait {
    fn initialize(
        env: Env,
        admin: Address,
        fee_address: String,
        signing_service: Address,
        settlement_gateway: Address,
        initial_credits: u64,
    );

    // Subscription registry
    fn create_subscription(env: Env, caller: Address, request: CreateSubscriptionRequest)
        -> String;
    fn get_subscription(env: Env, subscription_id: String) -> Option<Subscription>;
    fn list_subscriptions(
        env: Env,
        filter: SubscriptionFilter,
        start: u32,
        limit: u32,
    ) -> Vec<Subscription>;
    fn list_subscriptions_for_license(
        env: Env,
        api_key: String,
        start: u32,
        limit: u32,
    ) -> Vec<Subscription>;
    fn pause_subscription(env: Env, caller: Address, subscription_id: String);
    fn resume_subscription(env: Env, caller: Address, subscription_id: String);
    fn cancel_subscription(env: Env, caller: Address, subscription_id: String);
    fn update_subscription_addresses(
        env: Env,
        caller: Address,
        subscription_id: String,
        new_subscriber: Option<String>,
        new_merchant: Option<String>,
    );
    fn get_overdue_subscriptions(env: Env) -> Vec<String>;
    fn resolve_overdue(env: Env, admin: Address, subscription_id: String);
    fn cleanup_old_subscriptions(env: Env, admin: Address, age_secs: u64) -> u32;

    // Scheduler
    fn tick(env: Env, keeper: Address) -> TickReport;
    fn trigger_subscription(env: Env, admin: Address, subscription_id: String)
        -> TriggerOutcome;

    // Signature authority
    fn get_ed25519_public_key(env: Env) -> BytesN<32>;
    fn set_signing_service(env: Env, admin: Address, service: Address);
    fn set_settlement_gateway(env: Env, admin: Address, gateway: Address);

    // License gate
    fn register_license(
        env: Env,
        admin: Address,
        api_key: String,
        tier: LicenseTier,
        expires_at: u64,
    ) -> BytesN<32>;
    fn revoke_license(env: Env, admin: Address, api_key: String);
    fn get_license_info(env: Env, api_key: String) -> LicenseValidation;

    // Resource monitor
    fn get_cycle_status(env: Env) -> ResourceReport;
    fn get_canister_health(env: Env) -> SchedulerHealth;
    fn refill_credits(env: Env, admin: Address, amount: u64);
    fn refill_from_fees(env: Env, admin: Address) -> u64;
    fn set_credit_threshold(env: Env, admin: Address, threshold: u64);
    fn set_auto_refill(env: Env, admin: Address, enabled: bool);

    // Governance
    fn add_admin(env: Env, controller: Address, new_admin: Address);
    fn remove_admin(env: Env, controller: Address, admin: Address);
    fn add_controller_admin(env: Env, controller: Address, new_controller: Address);
    fn add_read_only_user(env: Env, admin: Address, user: Address);
    fn remove_read_only_user(env: Env, admin: Address, user: Address);
    fn grant_keeper(env: Env, admin: Address, keeper: Address);
    fn revoke_keeper(env: Env, admin: Address, keeper: Address);
    fn get_admins(env: Env, caller: Address) -> Vec<Address>;
    fn get_read_only_users(env: Env, caller: Address) -> Vec<Address>;
    fn propose_fee_address_change(env: Env, admin: Address, new_address: String);
    fn cancel_fee_address_proposal(env: Env, admin: Address);
    fn execute_fee_address_change(env: Env, admin: Address);
    fn get_fee_governance_status(env: Env) -> FeeGovernance;
    fn emergency_pause_all(env: Env, admin: Address) -> u32;
    fn resume_operations(env: Env, admin: Address) -> u32;
    fn get_config(env: Env) -> SchedulerConfig;
    fn update_config(env: Env, admin: Address, config: SchedulerConfig);
    fn upgrade(env: Env, admin: Address, new_wasm_hash: BytesN<32>);
}
