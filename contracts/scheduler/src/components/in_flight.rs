use crate::components::core;
use crate::types::{DataKey, InFlightPayment, TriggerPhase};
use soroban_sdk::{BytesN, Env, String};

pub fn get(env: &Env, subscription_id: &String) -> Option<InFlightPayment> {
    env.storage()
        .persistent()
        .get(&DataKey::InFlight(subscription_id.clone()))
}

pub fn is_held(env: &Env, subscription_id: &String) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::InFlight(subscription_id.clone()))
}

/// Claims the guard before signing starts.
pub fn acquire(env: &Env, subscription_id: &String, timestamp: u64, tick: u64) -> InFlightPayment {
    let guard = InFlightPayment {
        subscription_id: subscription_id.clone(),
        phase: TriggerPhase::Signing,
        timestamp,
        signature: None,
        submitted_tick: tick,
        submitted_at: timestamp,
    };
    store(env, &guard);
    guard
}

/// Keeps the guard across ticks while the gateway reports the payment pending.
pub fn mark_submitted(
    env: &Env,
    guard: &mut InFlightPayment,
    signature: &BytesN<64>,
    tick: u64,
    now: u64,
) {
    guard.phase = TriggerPhase::Submitted;
    guard.signature = Some(signature.clone());
    guard.submitted_tick = tick;
    guard.submitted_at = now;
    store(env, guard);
}

pub fn release(env: &Env, subscription_id: &String) {
    env.storage()
        .persistent()
        .remove(&DataKey::InFlight(subscription_id.clone()));
}

fn store(env: &Env, guard: &InFlightPayment) {
    let key = DataKey::InFlight(guard.subscription_id.clone());
    env.storage().persistent().set(&key, guard);
    core::bump_persistent(env, &key);
}
