use crate::components::core;
use crate::errors::ContractError;
use crate::events::{publish_role_granted_event, publish_role_revoked_event};
use crate::types::{DataKey, Role};
use soroban_sdk::{panic_with_error, Address, Env, Vec};

pub fn has_role(env: &Env, account: &Address, role: Role) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Role(account.clone(), role))
        .unwrap_or(false)
}

pub fn members(env: &Env, role: Role) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::RoleMembers(role))
        .unwrap_or_else(|| Vec::new(env))
}

/// Writes the role flag and member list. Callers check authorization first.
pub fn grant_role(env: &Env, account: &Address, role: Role) {
    if has_role(env, account, role) {
        panic_with_error!(env, ContractError::RoleAlreadyGranted);
    }
    let key = DataKey::Role(account.clone(), role);
    env.storage().persistent().set(&key, &true);
    core::bump_persistent(env, &key);

    let mut list = members(env, role);
    list.push_back(account.clone());
    store_members(env, role, &list);
}

pub fn revoke_role(env: &Env, account: &Address, role: Role) {
    if !has_role(env, account, role) {
        panic_with_error!(env, ContractError::RoleNotGranted);
    }
    env.storage()
        .persistent()
        .remove(&DataKey::Role(account.clone(), role));

    let mut list = members(env, role);
    if let Some(index) = list.first_index_of(account) {
        list.remove(index);
    }
    store_members(env, role, &list);
}

fn store_members(env: &Env, role: Role, list: &Vec<Address>) {
    let key = DataKey::RoleMembers(role);
    env.storage().persistent().set(&key, list);
    core::bump_persistent(env, &key);
}

pub fn require_role(env: &Env, caller: &Address, role: Role) {
    caller.require_auth();
    if !has_role(env, caller, role) {
        panic_with_error!(env, ContractError::NotAuthorized);
    }
}

pub fn require_admin(env: &Env, caller: &Address) {
    require_role(env, caller, Role::Admin);
}

pub fn require_controller_admin(env: &Env, caller: &Address) {
    require_role(env, caller, Role::ControllerAdmin);
}

/// Keepers drive ticks; admins may drive them too.
pub fn require_keeper(env: &Env, caller: &Address) {
    caller.require_auth();
    if !has_role(env, caller, Role::Keeper) && !has_role(env, caller, Role::Admin) {
        panic_with_error!(env, ContractError::NotAuthorized);
    }
}

pub fn require_read_access(env: &Env, caller: &Address) {
    caller.require_auth();
    if !has_role(env, caller, Role::Admin)
        && !has_role(env, caller, Role::ControllerAdmin)
        && !has_role(env, caller, Role::ReadOnly)
    {
        panic_with_error!(env, ContractError::NotAuthorized);
    }
}

pub fn add_role_member(env: &Env, granted_by: &Address, account: &Address, role: Role) {
    grant_role(env, account, role);
    publish_role_granted_event(
        env,
        account.clone(),
        role_code(role),
        granted_by.clone(),
        env.ledger().timestamp(),
    );
}

pub fn remove_role_member(env: &Env, revoked_by: &Address, account: &Address, role: Role) {
    revoke_role(env, account, role);
    publish_role_revoked_event(
        env,
        account.clone(),
        role_code(role),
        revoked_by.clone(),
        env.ledger().timestamp(),
    );
}

fn role_code(role: Role) -> u32 {
    match role {
        Role::Admin => 0,
        Role::ControllerAdmin => 1,
        Role::ReadOnly => 2,
        Role::Keeper => 3,
    }
}
