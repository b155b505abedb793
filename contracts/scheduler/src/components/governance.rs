use crate::components::{access_control, core, registry};
use crate::config;
use crate::errors::ContractError;
use crate::events::{
    publish_config_updated_event, publish_contract_upgraded_event,
    publish_emergency_pause_event, publish_fee_address_changed_event,
    publish_fee_address_proposed_event, publish_fee_proposal_cancelled_event,
    publish_operations_resumed_event,
};
use crate::types::{DataKey, FeeAddressProposal, FeeGovernance, Role, SchedulerConfig};
use soroban_sdk::{log, panic_with_error, Address, BytesN, Env, String, Vec};

// ── Roles ─────────────────────────────────────────────────────────────────────

pub fn add_admin(env: &Env, controller: &Address, new_admin: &Address) {
    access_control::require_controller_admin(env, controller);
    access_control::add_role_member(env, controller, new_admin, Role::Admin);
}

/// Removes an admin. The controller can never remove itself, and the last
/// admin always stays.
pub fn remove_admin(env: &Env, controller: &Address, target: &Address) {
    access_control::require_controller_admin(env, controller);
    if controller == target {
        panic_with_error!(env, ContractError::CannotRemoveSelf);
    }
    if !access_control::has_role(env, target, Role::Admin) {
        panic_with_error!(env, ContractError::RoleNotGranted);
    }
    if access_control::members(env, Role::Admin).len() <= 1 {
        panic_with_error!(env, ContractError::LastAdmin);
    }
    access_control::remove_role_member(env, controller, target, Role::Admin);
}

pub fn add_controller_admin(env: &Env, controller: &Address, new_controller: &Address) {
    access_control::require_controller_admin(env, controller);
    access_control::add_role_member(env, controller, new_controller, Role::ControllerAdmin);
}

pub fn add_read_only_user(env: &Env, admin: &Address, user: &Address) {
    access_control::require_admin(env, admin);
    access_control::add_role_member(env, admin, user, Role::ReadOnly);
}

pub fn remove_read_only_user(env: &Env, admin: &Address, user: &Address) {
    access_control::require_admin(env, admin);
    access_control::remove_role_member(env, admin, user, Role::ReadOnly);
}

pub fn grant_keeper(env: &Env, admin: &Address, keeper: &Address) {
    access_control::require_admin(env, admin);
    access_control::add_role_member(env, admin, keeper, Role::Keeper);
}

pub fn revoke_keeper(env: &Env, admin: &Address, keeper: &Address) {
    access_control::require_admin(env, admin);
    access_control::remove_role_member(env, admin, keeper, Role::Keeper);
}

pub fn get_admins(env: &Env, caller: &Address) -> Vec<Address> {
    access_control::require_read_access(env, caller);
    access_control::members(env, Role::Admin)
}

pub fn get_read_only_users(env: &Env, caller: &Address) -> Vec<Address> {
    access_control::require_read_access(env, caller);
    access_control::members(env, Role::ReadOnly)
}

// ── Fee address (time-locked) ─────────────────────────────────────────────────

fn fee_address(env: &Env) -> String {
    env.storage()
        .instance()
        .get(&DataKey::FeeAddress)
        .unwrap_or_else(|| panic_with_error!(env, ContractError::NotInitialized))
}

fn pending_proposal(env: &Env) -> Option<FeeAddressProposal> {
    env.storage().instance().get(&DataKey::FeeProposal)
}

pub fn get_fee_governance_status(env: &Env) -> FeeGovernance {
    let pending = pending_proposal(env);
    FeeGovernance {
        current_address: fee_address(env),
        pending_address: pending.as_ref().map(|p| p.proposed_address.clone()),
        proposed_by: pending.as_ref().map(|p| p.proposed_by.clone()),
        proposed_at: pending.as_ref().map(|p| p.proposed_at),
        executable_at: pending.as_ref().map(|p| p.executable_at),
    }
}

pub fn propose_fee_address_change(env: &Env, admin: &Address, new_address: &String) {
    access_control::require_admin(env, admin);
    if !registry::is_valid_chain_address(new_address) {
        panic_with_error!(env, ContractError::InvalidAddress);
    }
    if pending_proposal(env).is_some() {
        panic_with_error!(env, ContractError::ProposalPending);
    }

    let now = env.ledger().timestamp();
    let executable_at = now.saturating_add(config::load(env).fee_proposal_delay_secs);
    env.storage().instance().set(
        &DataKey::FeeProposal,
        &FeeAddressProposal {
            proposed_address: new_address.clone(),
            proposed_by: admin.clone(),
            proposed_at: now,
            executable_at,
        },
    );

    publish_fee_address_proposed_event(env, new_address.clone(), admin.clone(), executable_at);
}

pub fn cancel_fee_address_proposal(env: &Env, admin: &Address) {
    access_control::require_admin(env, admin);
    let proposal = pending_proposal(env)
        .unwrap_or_else(|| panic_with_error!(env, ContractError::NoPendingProposal));
    env.storage().instance().remove(&DataKey::FeeProposal);

    publish_fee_proposal_cancelled_event(
        env,
        proposal.proposed_address,
        admin.clone(),
        env.ledger().timestamp(),
    );
}

pub fn execute_fee_address_change(env: &Env, admin: &Address) {
    access_control::require_admin(env, admin);
    let proposal = pending_proposal(env)
        .unwrap_or_else(|| panic_with_error!(env, ContractError::NoPendingProposal));

    let now = env.ledger().timestamp();
    if now < proposal.executable_at {
        panic_with_error!(env, ContractError::ProposalNotMatured);
    }

    let old_address = fee_address(env);
    env.storage()
        .instance()
        .set(&DataKey::FeeAddress, &proposal.proposed_address);
    env.storage().instance().remove(&DataKey::FeeProposal);

    publish_fee_address_changed_event(
        env,
        old_address,
        proposal.proposed_address,
        admin.clone(),
        now,
    );
}

// ── Emergency controls ────────────────────────────────────────────────────────

pub fn emergency_pause_all(env: &Env, admin: &Address) -> u32 {
    access_control::require_admin(env, admin);
    if core::is_halted(env) {
        panic_with_error!(env, ContractError::OperationsHalted);
    }
    core::set_halted(env, true);
    let paused = registry::pause_all_for_emergency(env);

    log!(env, "emergency pause: {} subscriptions paused", paused);
    publish_emergency_pause_event(env, admin.clone(), paused, env.ledger().timestamp());
    paused
}

pub fn resume_operations(env: &Env, admin: &Address) -> u32 {
    access_control::require_admin(env, admin);
    if !core::is_halted(env) {
        panic_with_error!(env, ContractError::InvalidState);
    }
    core::set_halted(env, false);
    let resumed = registry::resume_after_emergency(env);

    log!(env, "operations resumed: {} subscriptions reactivated", resumed);
    publish_operations_resumed_event(env, admin.clone(), resumed, env.ledger().timestamp());
    resumed
}

// ── Configuration & code ──────────────────────────────────────────────────────

pub fn update_config(env: &Env, admin: &Address, new_config: &SchedulerConfig) {
    access_control::require_admin(env, admin);
    config::store(env, new_config);
    publish_config_updated_event(env, admin.clone(), env.ledger().timestamp());
}

pub fn upgrade(env: &Env, admin: &Address, new_wasm_hash: &BytesN<32>) {
    access_control::require_admin(env, admin);
    env.deployer()
        .update_current_contract_wasm(new_wasm_hash.clone());
    publish_contract_upgraded_event(env, new_wasm_hash.clone(), env.ledger().timestamp());
}
