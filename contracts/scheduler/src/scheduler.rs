use crate::components::{
    core as core_component, governance as governance_component, health as health_component,
    license as license_component, registry as registry_component, resource as resource_component,
    scheduler as scheduler_component, settlement as settlement_component,
    signing as signing_component,
};
use crate::config;
use crate::interface::SchedulerTrait;
use crate::types::{
    CreateSubscriptionRequest, FeeGovernance, LicenseTier, LicenseValidation, ResourceReport,
    SchedulerConfig, SchedulerHealth, Subscription, SubscriptionFilter, TickReport,
    TriggerOutcome,
};
use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, String, Vec};

#[contract]
pub struct SubscriptionScheduler;

#[contractimpl]
impl SchedulerTrait for SubscriptionScheduler {
    fn initialize(
        env: Env,
        admin: Address,
        fee_address: String,
        signing_service: Address,
        settlement_gateway: Address,
        initial_credits: u64,
    ) {
        core_component::initialize(
            &env,
            &admin,
            &fee_address,
            &signing_service,
            &settlement_gateway,
            initial_credits,
        );
    }

    fn create_subscription(
        env: Env,
        caller: Address,
        request: CreateSubscriptionRequest,
    ) -> String {
        core_component::assert_initialized(&env);
        registry_component::create(&env, &caller, &request)
    }

    fn get_subscription(env: Env, subscription_id: String) -> Option<Subscription> {
        registry_component::get(&env, &subscription_id)
    }

    fn list_subscriptions(
        env: Env,
        filter: SubscriptionFilter,
        start: u32,
        limit: u32,
    ) -> Vec<Subscription> {
        registry_component::list(&env, &filter, start, limit)
    }

    fn list_subscriptions_for_license(
        env: Env,
        api_key: String,
        start: u32,
        limit: u32,
    ) -> Vec<Subscription> {
        core_component::assert_initialized(&env);
        registry_component::list_for_license(&env, &api_key, start, limit)
    }

    fn pause_subscription(env: Env, caller: Address, subscription_id: String) {
        registry_component::pause(&env, &caller, &subscription_id);
    }

    fn resume_subscription(env: Env, caller: Address, subscription_id: String) {
        registry_component::resume(&env, &caller, &subscription_id);
    }

    fn cancel_subscription(env: Env, caller: Address, subscription_id: String) {
        registry_component::cancel(&env, &caller, &subscription_id);
    }

    fn update_subscription_addresses(
        env: Env,
        caller: Address,
        subscription_id: String,
        new_subscriber: Option<String>,
        new_merchant: Option<String>,
    ) {
        registry_component::update_addresses(
            &env,
            &caller,
            &subscription_id,
            &new_subscriber,
            &new_merchant,
        );
    }

    fn get_overdue_subscriptions(env: Env) -> Vec<String> {
        registry_component::get_overdue(&env)
    }

    fn resolve_overdue(env: Env, admin: Address, subscription_id: String) {
        registry_component::resolve_overdue(&env, &admin, &subscription_id);
    }

    fn cleanup_old_subscriptions(env: Env, admin: Address, age_secs: u64) -> u32 {
        registry_component::cleanup_older_than(&env, &admin, age_secs)
    }

    fn tick(env: Env, keeper: Address) -> TickReport {
        core_component::assert_initialized(&env);
        scheduler_component::tick(&env, &keeper)
    }

    fn trigger_subscription(env: Env, admin: Address, subscription_id: String) -> TriggerOutcome {
        scheduler_component::trigger_subscription(&env, &admin, &subscription_id)
    }

    fn get_ed25519_public_key(env: Env) -> BytesN<32> {
        signing_component::get_public_key(&env)
    }

    fn set_signing_service(env: Env, admin: Address, service: Address) {
        signing_component::set_signing_service(&env, &admin, &service);
    }

    fn set_settlement_gateway(env: Env, admin: Address, gateway: Address) {
        settlement_component::set_settlement_gateway(&env, &admin, &gateway);
    }

    fn register_license(
        env: Env,
        admin: Address,
        api_key: String,
        tier: LicenseTier,
        expires_at: u64,
    ) -> BytesN<32> {
        license_component::register_license(&env, &admin, &api_key, tier, expires_at)
    }

    fn revoke_license(env: Env, admin: Address, api_key: String) {
        license_component::revoke_license(&env, &admin, &api_key);
    }

    fn get_license_info(env: Env, api_key: String) -> LicenseValidation {
        core_component::assert_initialized(&env);
        license_component::get_license_info(&env, &api_key)
    }

    fn get_cycle_status(env: Env) -> ResourceReport {
        resource_component::get_cycle_status(&env)
    }

    fn get_canister_health(env: Env) -> SchedulerHealth {
        health_component::get_health(&env)
    }

    fn refill_credits(env: Env, admin: Address, amount: u64) {
        resource_component::refill_credits(&env, &admin, amount);
    }

    fn refill_from_fees(env: Env, admin: Address) -> u64 {
        resource_component::refill_from_fees(&env, &admin)
    }

    fn set_credit_threshold(env: Env, admin: Address, threshold: u64) {
        resource_component::set_credit_threshold(&env, &admin, threshold);
    }

    fn set_auto_refill(env: Env, admin: Address, enabled: bool) {
        resource_component::set_auto_refill(&env, &admin, enabled);
    }

    fn add_admin(env: Env, controller: Address, new_admin: Address) {
        governance_component::add_admin(&env, &controller, &new_admin);
    }

    fn remove_admin(env: Env, controller: Address, admin: Address) {
        governance_component::remove_admin(&env, &controller, &admin);
    }

    fn add_controller_admin(env: Env, controller: Address, new_controller: Address) {
        governance_component::add_controller_admin(&env, &controller, &new_controller);
    }

    fn add_read_only_user(env: Env, admin: Address, user: Address) {
        governance_component::add_read_only_user(&env, &admin, &user);
    }

    fn remove_read_only_user(env: Env, admin: Address, user: Address) {
        governance_component::remove_read_only_user(&env, &admin, &user);
    }

    fn grant_keeper(env: Env, admin: Address, keeper: Address) {
        governance_component::grant_keeper(&env, &admin, &keeper);
    }

    fn revoke_keeper(env: Env, admin: Address, keeper: Address) {
        governance_component::revoke_keeper(&env, &admin, &keeper);
    }

    fn get_admins(env: Env, caller: Address) -> Vec<Address> {
        governance_component::get_admins(&env, &caller)
    }

    fn get_read_only_users(env: Env, caller: Address) -> Vec<Address> {
        governance_component::get_read_only_users(&env, &caller)
    }

    fn propose_fee_address_change(env: Env, admin: Address, new_address: String) {
        governance_component::propose_fee_address_change(&env, &admin, &new_address);
    }

    fn cancel_fee_address_proposal(env: Env, admin: Address) {
        governance_component::cancel_fee_address_proposal(&env, &admin);
    }

    fn execute_fee_address_change(env: Env, admin: Address) {
        governance_component::execute_fee_address_change(&env, &admin);
    }

    fn get_fee_governance_status(env: Env) -> FeeGovernance {
        governance_component::get_fee_governance_status(&env)
    }

    fn emergency_pause_all(env: Env, admin: Address) -> u32 {
        governance_component::emergency_pause_all(&env, &admin)
    }

    fn resume_operations(env: Env, admin: Address) -> u32 {
        governance_component::resume_operations(&env, &admin)
    }

    fn get_config(env: Env) -> SchedulerConfig {
        config::load(&env)
    }

    fn update_config(env: Env, admin: Address, config: SchedulerConfig) {
        governance_component::update_config(&env, &admin, &config);
    }

    fn upgrade(env: Env, admin: Address, new_wasm_hash: BytesN<32>) {
        governance_component::upgrade(&env, &admin, &new_wasm_hash);
    }
}
