#![cfg(test)]

use super::mocks::{expected_message, setup, GatewayMode, DAY, START_TIME};
use crate::components::scheduler::{backoff_delay, is_due};
use crate::errors::ContractError;
use crate::types::{
    PaymentFailure, RejectionReason, SchedulerConfig, SubscriptionStatus, TriggerOutcome,
};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

// ---------------------------------------------------------------------------
// Scenario: sub_A, daily, due at creation
// ---------------------------------------------------------------------------

#[test]
fn test_sub_a_lifecycle() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");

    // first tick triggers the payment
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.confirmed, 1);
    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.trigger_count, 1);
    assert_eq!(sub.next_execution, START_TIME + DAY);
    assert_eq!(sub.last_triggered, Some(START_TIME));

    // nothing due on an immediate second tick
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.processed, 0);
    assert_eq!(ctx.gateway.submissions(), 1);

    // three consecutive unreachable attempts make it overdue
    ctx.gateway.set_mode(&GatewayMode::Unreachable);
    ctx.advance(DAY);
    ctx.client.tick(&ctx.keeper);
    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.failed_payment_count, 1);
    assert_eq!(sub.retry_at, Some(ctx.now() + 300));
    assert_eq!(sub.last_error, Some(ContractError::SettlementUnreachable as u32));
    assert_eq!(sub.last_rejection, None);

    ctx.advance(300);
    ctx.client.tick(&ctx.keeper);
    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.failed_payment_count, 2);
    assert_eq!(sub.retry_at, Some(ctx.now() + 600));

    ctx.advance(600);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.newly_overdue, 1);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.failed_payment_count, 3);
    assert!(sub.overdue);
    assert_eq!(sub.status, SubscriptionStatus::Active);

    let overdue = ctx.client.get_overdue_subscriptions();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue.get(0).unwrap(), id);
}

#[test]
fn test_overdue_subscription_is_not_retried_automatically() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Reject);
    for _ in 0..3 {
        ctx.client.tick(&ctx.keeper);
        ctx.advance(DAY);
    }
    let sub = ctx.client.get_subscription(&id).unwrap();
    assert!(sub.overdue);
    assert_eq!(sub.failed_payment_count, 3);

    ctx.gateway.set_mode(&GatewayMode::Confirm);
    ctx.advance(5 * DAY);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.processed, 0);
    assert_eq!(ctx.client.get_subscription(&id).unwrap().failed_payment_count, 3);
}

#[test]
fn test_rejection_is_recorded_with_reason() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Reject);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.failed, 1);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.last_error, Some(ContractError::SettlementRejected as u32));
    assert_eq!(
        sub.last_rejection,
        Some(RejectionReason::InsufficientFunds as u32)
    );
    // rejected payments are not resubmitted within the tick
    assert_eq!(ctx.gateway.submissions(), 1);
}

#[test]
fn test_signer_outage_counts_as_failure() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.signer.set_offline(&true);
    ctx.client.tick(&ctx.keeper);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.last_error, Some(ContractError::SigningFailed as u32));
    assert_eq!(sub.consecutive_failures, 1);
    assert_eq!(ctx.gateway.submissions(), 0);
}

#[test]
fn test_success_resets_consecutive_failures() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Reject);
    ctx.client.tick(&ctx.keeper);

    ctx.gateway.set_mode(&GatewayMode::Confirm);
    ctx.advance(300);
    ctx.client.tick(&ctx.keeper);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.trigger_count, 1);
    assert_eq!(sub.consecutive_failures, 0);
    assert_eq!(sub.failed_payment_count, 1);
    assert!(sub.retry_at.is_none());
}

#[test]
fn test_one_time_subscription_expires_after_confirmation() {
    let ctx = setup();
    let id = ctx
        .client
        .create_subscription(&ctx.owner, &ctx.request("once", 500, 0));
    ctx.client.tick(&ctx.keeper);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Expired);
    assert_eq!(sub.trigger_count, 1);
    assert_eq!(
        ctx.client
            .get_license_info(&ctx.api_key)
            .active_subscriptions,
        0
    );

    ctx.advance(DAY);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.processed, 0);
}

#[test]
fn test_missed_periods_are_skipped_not_replayed() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.advance(3 * DAY + DAY / 2);

    ctx.client.tick(&ctx.keeper);
    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.trigger_count, 1);
    assert_eq!(sub.next_execution, START_TIME + 4 * DAY);

    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.processed, 0);
}

#[test]
fn test_paused_subscription_is_skipped() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.client.pause_subscription(&ctx.owner, &id);

    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.processed, 0);

    ctx.client.resume_subscription(&ctx.owner, &id);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.confirmed, 1);
}

#[test]
fn test_max_triggers_per_tick() {
    let ctx = setup();
    let mut config = ctx.client.get_config();
    config.max_triggers_per_tick = 2;
    ctx.client.update_config(&ctx.admin, &config);

    ctx.create_daily("sub-1");
    ctx.create_daily("sub-2");
    ctx.create_daily("sub-3");

    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.confirmed, 2);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.confirmed, 1);
    assert_eq!(
        ctx.client
            .get_subscription(&ctx.id("sub-3"))
            .unwrap()
            .trigger_count,
        1
    );
}

#[test]
fn test_authorization_carries_valid_signature() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.client.tick(&ctx.keeper);

    let authorization = ctx.gateway.last_authorization().unwrap();
    assert_eq!(authorization.subscription_id, id);
    assert_eq!(authorization.amount, 10_000_000);
    assert_eq!(authorization.timestamp, START_TIME);
    assert_eq!(authorization.valid_until, START_TIME + 30);

    let verifying_key = VerifyingKey::from_bytes(&ctx.public_key).unwrap();
    let signature = Signature::from_bytes(&authorization.signature.to_array());
    let message = expected_message(&id, START_TIME, 10_000_000);
    assert!(verifying_key.verify(&message, &signature).is_ok());
}

#[test]
fn test_authorization_delivered_past_its_window_is_rejected() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_delivery_delay(&31);

    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.failed, 1);
    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.last_error, Some(ContractError::SettlementRejected as u32));
    assert_eq!(
        sub.last_rejection,
        Some(RejectionReason::StaleTimestamp as u32)
    );
    assert_eq!(sub.trigger_count, 0);
}

#[test]
fn test_wider_validity_window_tolerates_slow_delivery() {
    let ctx = setup();
    let mut config = ctx.client.get_config();
    config.signature_validity_secs = 120;
    ctx.client.update_config(&ctx.admin, &config);

    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_delivery_delay(&90);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.confirmed, 1);
    assert_eq!(
        ctx.gateway.last_authorization().unwrap().valid_until,
        START_TIME + 120
    );
    assert_eq!(ctx.client.get_subscription(&id).unwrap().trigger_count, 1);
}

// ---------------------------------------------------------------------------
// In-flight guard
// ---------------------------------------------------------------------------

#[test]
fn test_pending_payment_holds_guard_and_prevents_double_submission() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Pending);

    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.pending, 1);
    assert_eq!(ctx.client.get_canister_health().in_flight_count, 1);

    // still pending: polled, never resubmitted
    ctx.client.tick(&ctx.keeper);
    assert_eq!(ctx.gateway.submissions(), 1);

    let result = ctx.client.try_trigger_subscription(&ctx.admin, &id);
    assert!(result.is_err());

    ctx.gateway.set_poll_mode(&GatewayMode::Confirm);
    let report = ctx.client.tick(&ctx.keeper);
    assert_eq!(report.confirmed, 1);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.trigger_count, 1);
    assert_eq!(ctx.client.get_canister_health().in_flight_count, 0);
    assert_eq!(ctx.gateway.submissions(), 1);
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #19)")]
fn test_manual_trigger_blocked_while_in_flight() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Pending);
    ctx.client.tick(&ctx.keeper);
    ctx.client.trigger_subscription(&ctx.admin, &id);
}

#[test]
fn test_pending_payment_times_out() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Pending);

    ctx.client.tick(&ctx.keeper); // submitted on tick 1
    ctx.client.tick(&ctx.keeper);
    ctx.client.tick(&ctx.keeper);
    assert_eq!(ctx.client.get_canister_health().in_flight_count, 1);

    let report = ctx.client.tick(&ctx.keeper); // tick 4: window of 3 ticks elapsed
    assert_eq!(report.timed_out, 1);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.last_error, Some(ContractError::TimedOut as u32));
    assert_eq!(sub.consecutive_failures, 1);
    assert_eq!(ctx.client.get_canister_health().in_flight_count, 0);
}

#[test]
fn test_cancel_during_flight_drops_late_confirmation() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Pending);
    ctx.client.tick(&ctx.keeper);

    ctx.client.cancel_subscription(&ctx.owner, &id);
    ctx.gateway.set_poll_mode(&GatewayMode::Confirm);
    ctx.client.tick(&ctx.keeper);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Cancelled);
    assert_eq!(sub.trigger_count, 0);
    assert_eq!(ctx.client.get_canister_health().in_flight_count, 0);
}

// ---------------------------------------------------------------------------
// Manual trigger and overdue resolution
// ---------------------------------------------------------------------------

#[test]
fn test_manual_trigger_collects_overdue_subscription() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Reject);
    for _ in 0..3 {
        ctx.client.tick(&ctx.keeper);
        ctx.advance(DAY);
    }
    assert!(ctx.client.get_subscription(&id).unwrap().overdue);

    ctx.gateway.set_mode(&GatewayMode::Confirm);
    let outcome = ctx.client.trigger_subscription(&ctx.admin, &id);
    assert_eq!(outcome, TriggerOutcome::Confirmed);

    let sub = ctx.client.get_subscription(&id).unwrap();
    assert!(!sub.overdue);
    assert_eq!(sub.trigger_count, 1);
    assert_eq!(ctx.client.get_overdue_subscriptions().len(), 0);
}

#[test]
fn test_manual_trigger_reports_failure() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Unreachable);
    let outcome = ctx.client.trigger_subscription(&ctx.admin, &id);
    assert_eq!(
        outcome,
        TriggerOutcome::Failed(PaymentFailure::SettlementUnreachable)
    );
    assert_eq!(ctx.client.get_subscription(&id).unwrap().failed_payment_count, 1);
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #10)")]
fn test_manual_trigger_requires_active_subscription() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.client.pause_subscription(&ctx.owner, &id);
    ctx.client.trigger_subscription(&ctx.admin, &id);
}

#[test]
fn test_resolve_overdue_advances_schedule() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.gateway.set_mode(&GatewayMode::Reject);
    for _ in 0..3 {
        ctx.client.tick(&ctx.keeper);
        ctx.advance(DAY);
    }
    let before = ctx.client.get_subscription(&id).unwrap();

    ctx.client.resolve_overdue(&ctx.admin, &id);
    let sub = ctx.client.get_subscription(&id).unwrap();
    assert!(!sub.overdue);
    assert_eq!(sub.consecutive_failures, 0);
    assert_eq!(sub.failed_payment_count, 3);
    assert!(sub.next_execution > before.next_execution);
    assert!(sub.next_execution > ctx.now());
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #10)")]
fn test_resolve_requires_overdue() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    ctx.client.resolve_overdue(&ctx.admin, &id);
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

#[test]
fn test_backoff_doubles_and_caps() {
    let config = SchedulerConfig::default();
    assert_eq!(backoff_delay(&config, 1), 300);
    assert_eq!(backoff_delay(&config, 2), 600);
    assert_eq!(backoff_delay(&config, 3), 1_200);
    assert_eq!(backoff_delay(&config, 10), 86_400);
    assert_eq!(backoff_delay(&config, u32::MAX), 86_400);
}

#[test]
fn test_is_due_respects_retry_deadline() {
    let ctx = setup();
    let id = ctx.create_daily("sub_A");
    let mut sub = ctx.client.get_subscription(&id).unwrap();
    assert!(is_due(&sub, START_TIME));
    assert!(!is_due(&sub, START_TIME - 1));

    sub.retry_at = Some(START_TIME + 300);
    assert!(!is_due(&sub, START_TIME + 299));
    assert!(is_due(&sub, START_TIME + 300));

    sub.overdue = true;
    assert!(!is_due(&sub, START_TIME + DAY));
}
