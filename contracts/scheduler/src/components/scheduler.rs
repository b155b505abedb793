//! Periodic scan and the payment trigger state machine.
//!
//! A trigger moves `Due -> Signing -> Submitted -> {Confirmed | Rejected |
//! TimedOut}`. The in-flight guard is held from signing until the gateway gives
//! a final answer, so a subscription is never submitted twice concurrently.

use crate::components::{access_control, core, in_flight, registry, resource, settlement, signing};
use crate::config;
use crate::errors::ContractError;
use crate::events::{
    publish_payment_confirmed_event, publish_payment_failed_event,
    publish_payment_submitted_event, publish_subscription_overdue_event,
    publish_tick_completed_event,
};
use crate::types::{
    InFlightPayment, PaymentAuthorization, PaymentFailure, SchedulerConfig, SettlementStatus,
    Subscription, SubscriptionStatus, TickReport, TriggerOutcome,
};
use soroban_sdk::{log, panic_with_error, Address, Env, String};

/// Active, not overdue, past both its schedule and any backoff deadline.
pub fn is_due(subscription: &Subscription, now: u64) -> bool {
    subscription.status == SubscriptionStatus::Active
        && !subscription.overdue
        && subscription.next_execution <= now
        && subscription.retry_at.map_or(true, |at| at <= now)
}

/// `base * 2^(n-1)` capped at `max`.
pub fn backoff_delay(config: &SchedulerConfig, consecutive_failures: u32) -> u64 {
    let exponent = consecutive_failures.saturating_sub(1).min(32);
    config
        .retry_base_delay_secs
        .saturating_mul(1u64 << exponent)
        .min(config.max_retry_delay_secs)
}

struct TickCounters {
    processed: u32,
    confirmed: u32,
    pending: u32,
    failed: u32,
    timed_out: u32,
    newly_overdue: u32,
}

impl TickCounters {
    fn new() -> Self {
        Self {
            processed: 0,
            confirmed: 0,
            pending: 0,
            failed: 0,
            timed_out: 0,
            newly_overdue: 0,
        }
    }

    fn record(&mut self, outcome: &TriggerOutcome, became_overdue: bool) {
        self.processed += 1;
        match outcome {
            TriggerOutcome::Confirmed => self.confirmed += 1,
            TriggerOutcome::Pending => self.pending += 1,
            TriggerOutcome::Failed(PaymentFailure::TimedOut) => {
                self.failed += 1;
                self.timed_out += 1;
            }
            TriggerOutcome::Failed(_) => self.failed += 1,
            TriggerOutcome::Skipped => {}
        }
        if became_overdue {
            self.newly_overdue += 1;
        }
    }

    fn into_report(self, tick: u64, timestamp: u64, aborted: bool, env: &Env) -> TickReport {
        let config = config::load(env);
        let (health, _) = resource::classify(env, &resource::load_ledger(env), &config);
        TickReport {
            tick,
            timestamp,
            processed: self.processed,
            confirmed: self.confirmed,
            pending: self.pending,
            failed: self.failed,
            timed_out: self.timed_out,
            newly_overdue: self.newly_overdue,
            aborted,
            health,
        }
    }
}

// ── bookkeeping ───────────────────────────────────────────────────────────────

fn apply_success(env: &Env, config: &SchedulerConfig, subscription: &mut Subscription, now: u64) {
    subscription.trigger_count += 1;
    subscription.last_triggered = Some(now);
    subscription.consecutive_failures = 0;
    subscription.overdue = false;
    subscription.retry_at = None;
    if subscription.interval_seconds == 0 {
        registry::finalize(env, subscription, SubscriptionStatus::Expired, now);
    } else {
        registry::advance_schedule(subscription, now);
    }
    registry::save(env, subscription);
    resource::credit_trigger_fee(env, config);

    let mut stats = core::load_stats(env);
    stats.total_triggers += 1;
    core::store_stats(env, &stats);

    publish_payment_confirmed_event(
        env,
        subscription.id.clone(),
        subscription.trigger_count,
        subscription.next_execution,
        now,
    );
}

/// Records a failed attempt. Returns `true` when this failure exhausted the
/// retry budget and the subscription became overdue.
fn apply_failure(
    env: &Env,
    config: &SchedulerConfig,
    subscription: &mut Subscription,
    failure: &PaymentFailure,
    now: u64,
) -> bool {
    if subscription.status != SubscriptionStatus::Active {
        return false;
    }
    subscription.failed_payment_count = subscription.failed_payment_count.saturating_add(1);
    subscription.consecutive_failures = subscription.consecutive_failures.saturating_add(1);
    subscription.last_failure_time = Some(now);
    subscription.last_error = Some(failure.as_error() as u32);
    subscription.last_rejection = failure.rejection().map(|reason| reason as u32);

    let became_overdue = !subscription.overdue
        && subscription.consecutive_failures >= config.max_consecutive_failures;
    if subscription.consecutive_failures >= config.max_consecutive_failures {
        subscription.overdue = true;
        subscription.retry_at = None;
    } else {
        subscription.retry_at =
            Some(now.saturating_add(backoff_delay(config, subscription.consecutive_failures)));
    }
    registry::save(env, subscription);

    let mut stats = core::load_stats(env);
    stats.total_failed_payments += 1;
    if *failure == PaymentFailure::TimedOut {
        stats.total_timeouts += 1;
    }
    core::store_stats(env, &stats);

    log!(
        env,
        "payment failed for {} ({} consecutive)",
        subscription.id,
        subscription.consecutive_failures
    );
    publish_payment_failed_event(
        env,
        subscription.id.clone(),
        failure.as_error() as u32,
        subscription.consecutive_failures,
        subscription.retry_at,
        now,
    );
    if became_overdue {
        publish_subscription_overdue_event(
            env,
            subscription.id.clone(),
            subscription.failed_payment_count,
            now,
        );
    }
    became_overdue
}

/// Applies a final answer for `id`. The record is fetched again here; when
/// it is gone or already terminal the answer is dropped.
fn settle(
    env: &Env,
    config: &SchedulerConfig,
    id: &String,
    result: Result<SettlementStatus, PaymentFailure>,
    now: u64,
) -> (TriggerOutcome, bool) {
    in_flight::release(env, id);
    let Some(mut subscription) = registry::find(env, id) else {
        log!(env, "subscription {} vanished during settlement", id);
        return (TriggerOutcome::Skipped, false);
    };
    if subscription.status.is_terminal() {
        return (TriggerOutcome::Skipped, false);
    }

    let failure = match result {
        Ok(SettlementStatus::Confirmed) => {
            apply_success(env, config, &mut subscription, now);
            return (TriggerOutcome::Confirmed, false);
        }
        Ok(SettlementStatus::Rejected(reason)) => PaymentFailure::SettlementRejected(reason),
        Ok(SettlementStatus::Pending) => PaymentFailure::TimedOut,
        Err(failure) => failure,
    };
    let overdue = apply_failure(env, config, &mut subscription, &failure, now);
    (TriggerOutcome::Failed(failure), overdue)
}

// ── trigger flow ──────────────────────────────────────────────────────────────

/// Runs one full trigger for a due subscription: sign, submit, settle.
fn run_payment(
    env: &Env,
    config: &SchedulerConfig,
    subscription: &Subscription,
    tick: u64,
) -> (TriggerOutcome, bool) {
    let now = env.ledger().timestamp();
    let id = subscription.id.clone();
    let mut guard = in_flight::acquire(env, &id, now, tick);

    let message = signing::build_message(env, &id, now, subscription.amount);
    let signature = match signing::sign(env, &message) {
        Ok(signature) => signature,
        Err(failure) => return settle(env, config, &id, Err(failure), now),
    };

    resource::charge(env, config.trigger_cost);
    let authorization = PaymentAuthorization {
        subscription_id: id.clone(),
        destination_program: subscription.destination_program.clone(),
        amount: subscription.amount,
        token_mint: subscription.token_mint.clone(),
        timestamp: now,
        valid_until: now.saturating_add(config.signature_validity_secs),
        signature: signature.clone(),
        subscriber: subscription.subscriber.clone(),
        merchant: subscription.merchant.clone(),
    };
    let (result, attempts) = settlement::submit(env, &authorization, config.submit_attempts);
    if attempts > 0 {
        publish_payment_submitted_event(env, id.clone(), subscription.amount, now, attempts);
    }

    if let Ok(SettlementStatus::Pending) = result {
        if registry::find(env, &id).is_some_and(|s| !s.status.is_terminal()) {
            in_flight::mark_submitted(env, &mut guard, &signature, tick, now);
            return (TriggerOutcome::Pending, false);
        }
        in_flight::release(env, &id);
        return (TriggerOutcome::Skipped, false);
    }
    settle(env, config, &id, result, now)
}

/// Polls the gateway for a payment left pending by an earlier tick. Returns
/// `None` while it is still within its confirmation window.
fn poll_in_flight(
    env: &Env,
    config: &SchedulerConfig,
    guard: &InFlightPayment,
    tick: u64,
) -> Option<(TriggerOutcome, bool)> {
    let now = env.ledger().timestamp();
    let id = &guard.subscription_id;
    let expired =
        tick.saturating_sub(guard.submitted_tick) >= config.confirmation_timeout_ticks as u64;

    match settlement::poll(env, id, guard.timestamp) {
        Ok(SettlementStatus::Confirmed) => {
            Some(settle(env, config, id, Ok(SettlementStatus::Confirmed), now))
        }
        Ok(SettlementStatus::Rejected(reason)) => Some(settle(
            env,
            config,
            id,
            Ok(SettlementStatus::Rejected(reason)),
            now,
        )),
        _ if expired => {
            log!(env, "confirmation timed out for {}", id.clone());
            Some(settle(env, config, id, Err(PaymentFailure::TimedOut), now))
        }
        _ => None,
    }
}

// ── entry points ──────────────────────────────────────────────────────────────

/// One scheduler pass over the registry in id order.
pub fn tick(env: &Env, keeper: &Address) -> TickReport {
    access_control::require_keeper(env, keeper);
    let config = config::load(env);
    let now = env.ledger().timestamp();
    let mut counters = TickCounters::new();

    let mut stats = core::load_stats(env);
    if core::is_halted(env) {
        log!(env, "tick skipped: operations halted");
        return counters.into_report(stats.total_ticks, now, true, env);
    }
    stats.total_ticks += 1;
    let tick = stats.total_ticks;
    core::store_stats(env, &stats);

    resource::charge(env, config.tick_cost);
    if resource::auto_refill(env).blocks_operations() {
        log!(env, "tick {} aborted: credits exhausted", tick);
        publish_tick_completed_event(env, tick, 0, 0, 0, true, now);
        return counters.into_report(tick, now, true, env);
    }

    let mut triggered = 0u32;
    let mut aborted = false;
    for id in registry::ids(env).iter() {
        if let Some(guard) = in_flight::get(env, &id) {
            if let Some((outcome, overdue)) = poll_in_flight(env, &config, &guard, tick) {
                counters.record(&outcome, overdue);
            }
            continue;
        }

        let Some(subscription) = registry::find(env, &id) else {
            continue;
        };
        if !is_due(&subscription, now) || triggered >= config.max_triggers_per_tick {
            continue;
        }
        if resource::current_balance_status(env).blocks_operations() {
            log!(env, "tick {} stopped early: credits exhausted", tick);
            aborted = true;
            break;
        }

        triggered += 1;
        let (outcome, overdue) = run_payment(env, &config, &subscription, tick);
        counters.record(&outcome, overdue);
    }

    resource::mark_tick(env, now);
    core::bump_instance(env);
    publish_tick_completed_event(
        env,
        tick,
        counters.processed,
        counters.confirmed,
        counters.failed,
        aborted,
        now,
    );
    counters.into_report(tick, now, aborted, env)
}

/// Runs the trigger flow immediately for one Active subscription, overdue or
/// not. Failures are recorded exactly as a scheduled attempt would.
pub fn trigger_subscription(env: &Env, admin: &Address, id: &String) -> TriggerOutcome {
    access_control::require_admin(env, admin);
    core::assert_not_halted(env);
    let subscription = registry::load(env, id);
    if subscription.status != SubscriptionStatus::Active {
        panic_with_error!(env, ContractError::InvalidState);
    }
    if in_flight::is_held(env, id) {
        panic_with_error!(env, ContractError::PaymentInFlight);
    }
    resource::assert_can_start_work(env);

    let config = config::load(env);
    let tick = core::load_stats(env).total_ticks;
    let (outcome, _) = run_payment(env, &config, &subscription, tick);
    outcome
}
