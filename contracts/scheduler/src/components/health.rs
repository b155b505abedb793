use crate::components::{core, in_flight, registry, resource};
use crate::config;
use crate::types::{SchedulerHealth, SubscriptionStatus};
use soroban_sdk::Env;

pub fn get_health(env: &Env) -> SchedulerHealth {
    let ledger = resource::load_ledger(env);
    let stats = core::load_stats(env);
    let (status, degradation_reason) = resource::classify(env, &ledger, &config::load(env));

    let ids = registry::ids(env);
    let mut active_count = 0u32;
    let mut overdue_count = 0u32;
    let mut in_flight_count = 0u32;
    for id in ids.iter() {
        if in_flight::is_held(env, &id) {
            in_flight_count += 1;
        }
        let Some(subscription) = registry::find(env, &id) else {
            continue;
        };
        if subscription.status == SubscriptionStatus::Active {
            active_count += 1;
            if subscription.overdue {
                overdue_count += 1;
            }
        }
    }

    SchedulerHealth {
        status,
        degradation_reason: degradation_reason.map(|reason| reason as u32),
        uptime_seconds: env.ledger().timestamp().saturating_sub(stats.started_at),
        subscription_count: ids.len(),
        active_count,
        overdue_count,
        in_flight_count,
        failed_payments: stats.total_failed_payments,
        credit_balance: ledger.current_balance,
        last_tick_at: ledger.last_tick_at,
        operations_halted: core::is_halted(env),
    }
}
