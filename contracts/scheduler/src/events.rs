use soroban_sdk::{contractevent, Address, BytesN, Env, String};

#[contractevent]
pub struct InitializedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

pub fn publish_initialized_event(env: &Env, admin: Address, timestamp: u64) {
    InitializedEvent { admin, timestamp }.publish(env);
}

// ── Subscription lifecycle ────────────────────────────────────────────────────

#[contractevent]
pub struct SubscriptionCreatedEvent {
    pub subscription_id: String,
    pub owner: Address,
    pub license_id: BytesN<32>,
    pub amount: u64,
    pub interval_seconds: u64,
    pub next_execution: u64,
    pub timestamp: u64,
}

#[allow(clippy::too_many_arguments)]
pub fn publish_subscription_created_event(
    env: &Env,
    subscription_id: String,
    owner: Address,
    license_id: BytesN<32>,
    amount: u64,
    interval_seconds: u64,
    next_execution: u64,
    timestamp: u64,
) {
    SubscriptionCreatedEvent {
        subscription_id,
        owner,
        license_id,
        amount,
        interval_seconds,
        next_execution,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["sub_paused"])]
pub struct SubscriptionPausedEvent {
    pub subscription_id: String,
    pub caller: Address,
    pub timestamp: u64,
}

pub fn publish_subscription_paused_event(
    env: &Env,
    subscription_id: String,
    caller: Address,
    timestamp: u64,
) {
    SubscriptionPausedEvent {
        subscription_id,
        caller,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["sub_resumed"])]
pub struct SubscriptionResumedEvent {
    pub subscription_id: String,
    pub caller: Address,
    pub timestamp: u64,
}

pub fn publish_subscription_resumed_event(
    env: &Env,
    subscription_id: String,
    caller: Address,
    timestamp: u64,
) {
    SubscriptionResumedEvent {
        subscription_id,
        caller,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["sub_cancelled"])]
pub struct SubscriptionCancelledEvent {
    pub subscription_id: String,
    pub caller: Address,
    pub timestamp: u64,
}

pub fn publish_subscription_cancelled_event(
    env: &Env,
    subscription_id: String,
    caller: Address,
    timestamp: u64,
) {
    SubscriptionCancelledEvent {
        subscription_id,
        caller,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["sub_addresses"])]
pub struct SubAddressesUpdatedEvent {
    pub subscription_id: String,
    pub subscriber: String,
    pub merchant: String,
    pub caller: Address,
    pub timestamp: u64,
}

pub fn publish_subscription_addresses_updated_event(
    env: &Env,
    subscription_id: String,
    subscriber: String,
    merchant: String,
    caller: Address,
    timestamp: u64,
) {
    SubAddressesUpdatedEvent {
        subscription_id,
        subscriber,
        merchant,
        caller,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["sub_cleanup"], data_format = "single-value")]
pub struct SubscriptionsCleanedUpEvent {
    pub removed: u32,
}

pub fn publish_subscriptions_cleaned_up_event(env: &Env, removed: u32) {
    SubscriptionsCleanedUpEvent { removed }.publish(env);
}

// ── Payments ──────────────────────────────────────────────────────────────────

#[contractevent(topics = ["pay_submitted"])]
pub struct PaymentSubmittedEvent {
    pub subscription_id: String,
    pub amount: u64,
    pub signed_at: u64,
    pub attempts: u32,
}

pub fn publish_payment_submitted_event(
    env: &Env,
    subscription_id: String,
    amount: u64,
    signed_at: u64,
    attempts: u32,
) {
    PaymentSubmittedEvent {
        subscription_id,
        amount,
        signed_at,
        attempts,
    }
    .publish(env);
}

#[contractevent(topics = ["pay_confirmed"])]
pub struct PaymentConfirmedEvent {
    pub subscription_id: String,
    pub trigger_count: u64,
    pub next_execution: u64,
    pub timestamp: u64,
}

pub fn publish_payment_confirmed_event(
    env: &Env,
    subscription_id: String,
    trigger_count: u64,
    next_execution: u64,
    timestamp: u64,
) {
    PaymentConfirmedEvent {
        subscription_id,
        trigger_count,
        next_execution,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["pay_failed"])]
pub struct PaymentFailedEvent {
    pub subscription_id: String,
    /// `ContractError` code of the failure kind.
    pub error_code: u32,
    pub consecutive_failures: u32,
    pub retry_at: Option<u64>,
    pub timestamp: u64,
}

pub fn publish_payment_failed_event(
    env: &Env,
    subscription_id: String,
    error_code: u32,
    consecutive_failures: u32,
    retry_at: Option<u64>,
    timestamp: u64,
) {
    PaymentFailedEvent {
        subscription_id,
        error_code,
        consecutive_failures,
        retry_at,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["sub_overdue"])]
pub struct SubscriptionOverdueEvent {
    pub subscription_id: String,
    pub failed_payment_count: u32,
    pub timestamp: u64,
}

pub fn publish_subscription_overdue_event(
    env: &Env,
    subscription_id: String,
    failed_payment_count: u32,
    timestamp: u64,
) {
    SubscriptionOverdueEvent {
        subscription_id,
        failed_payment_count,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["overdue_resolved"])]
pub struct OverdueResolvedEvent {
    pub subscription_id: String,
    pub admin: Address,
    pub next_execution: u64,
    pub timestamp: u64,
}

pub fn publish_overdue_resolved_event(
    env: &Env,
    subscription_id: String,
    admin: Address,
    next_execution: u64,
    timestamp: u64,
) {
    OverdueResolvedEvent {
        subscription_id,
        admin,
        next_execution,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["tick"])]
pub struct TickCompletedEvent {
    pub tick: u64,
    pub processed: u32,
    pub confirmed: u32,
    pub failed: u32,
    pub aborted: bool,
    pub timestamp: u64,
}

pub fn publish_tick_completed_event(
    env: &Env,
    tick: u64,
    processed: u32,
    confirmed: u32,
    failed: u32,
    aborted: bool,
    timestamp: u64,
) {
    TickCompletedEvent {
        tick,
        processed,
        confirmed,
        failed,
        aborted,
        timestamp,
    }
    .publish(env);
}

// ── Licenses ──────────────────────────────────────────────────────────────────

#[contractevent]
pub struct LicenseRegisteredEvent {
    pub license_id: BytesN<32>,
    pub tier: u32,
    pub expires_at: u64,
    pub timestamp: u64,
}

pub fn publish_license_registered_event(
    env: &Env,
    license_id: BytesN<32>,
    tier: u32,
    expires_at: u64,
    timestamp: u64,
) {
    LicenseRegisteredEvent {
        license_id,
        tier,
        expires_at,
        timestamp,
    }
    .publish(env);
}

#[contractevent]
pub struct LicenseRevokedEvent {
    pub license_id: BytesN<32>,
    pub timestamp: u64,
}

pub fn publish_license_revoked_event(env: &Env, license_id: BytesN<32>, timestamp: u64) {
    LicenseRevokedEvent {
        license_id,
        timestamp,
    }
    .publish(env);
}

// ── Governance ────────────────────────────────────────────────────────────────

#[contractevent(topics = ["role_granted"])]
pub struct RoleGrantedEvent {
    pub account: Address,
    pub role: u32,
    pub granted_by: Address,
    pub timestamp: u64,
}

pub fn publish_role_granted_event(
    env: &Env,
    account: Address,
    role: u32,
    granted_by: Address,
    timestamp: u64,
) {
    RoleGrantedEvent {
        account,
        role,
        granted_by,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["role_revoked"])]
pub struct RoleRevokedEvent {
    pub account: Address,
    pub role: u32,
    pub revoked_by: Address,
    pub timestamp: u64,
}

pub fn publish_role_revoked_event(
    env: &Env,
    account: Address,
    role: u32,
    revoked_by: Address,
    timestamp: u64,
) {
    RoleRevokedEvent {
        account,
        role,
        revoked_by,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["fee_proposed"])]
pub struct FeeAddressProposedEvent {
    pub proposed_address: String,
    pub proposed_by: Address,
    pub executable_at: u64,
}

pub fn publish_fee_address_proposed_event(
    env: &Env,
    proposed_address: String,
    proposed_by: Address,
    executable_at: u64,
) {
    FeeAddressProposedEvent {
        proposed_address,
        proposed_by,
        executable_at,
    }
    .publish(env);
}

#[contractevent(topics = ["fee_cancelled"])]
pub struct FeeProposalCancelledEvent {
    pub proposed_address: String,
    pub cancelled_by: Address,
    pub timestamp: u64,
}

pub fn publish_fee_proposal_cancelled_event(
    env: &Env,
    proposed_address: String,
    cancelled_by: Address,
    timestamp: u64,
) {
    FeeProposalCancelledEvent {
        proposed_address,
        cancelled_by,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["fee_changed"])]
pub struct FeeAddressChangedEvent {
    pub old_address: String,
    pub new_address: String,
    pub executed_by: Address,
    pub timestamp: u64,
}

pub fn publish_fee_address_changed_event(
    env: &Env,
    old_address: String,
    new_address: String,
    executed_by: Address,
    timestamp: u64,
) {
    FeeAddressChangedEvent {
        old_address,
        new_address,
        executed_by,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["emergency_pause"])]
pub struct EmergencyPauseEvent {
    pub admin: Address,
    pub paused: u32,
    pub timestamp: u64,
}

pub fn publish_emergency_pause_event(env: &Env, admin: Address, paused: u32, timestamp: u64) {
    EmergencyPauseEvent {
        admin,
        paused,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["ops_resumed"])]
pub struct OperationsResumedEvent {
    pub admin: Address,
    pub resumed: u32,
    pub timestamp: u64,
}

pub fn publish_operations_resumed_event(
    env: &Env,
    admin: Address,
    resumed: u32,
    timestamp: u64,
) {
    OperationsResumedEvent {
        admin,
        resumed,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["config_updated"])]
pub struct ConfigUpdatedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

pub fn publish_config_updated_event(env: &Env, admin: Address, timestamp: u64) {
    ConfigUpdatedEvent { admin, timestamp }.publish(env);
}

#[contractevent(topics = ["signer_set"])]
pub struct SigningServiceSetEvent {
    pub service: Address,
    pub public_key: BytesN<32>,
    pub timestamp: u64,
}

pub fn publish_signing_service_set_event(
    env: &Env,
    service: Address,
    public_key: BytesN<32>,
    timestamp: u64,
) {
    SigningServiceSetEvent {
        service,
        public_key,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["gateway_set"])]
pub struct SettlementGatewaySetEvent {
    pub gateway: Address,
    pub timestamp: u64,
}

pub fn publish_settlement_gateway_set_event(env: &Env, gateway: Address, timestamp: u64) {
    SettlementGatewaySetEvent { gateway, timestamp }.publish(env);
}

#[contractevent(topics = ["upgraded"])]
pub struct ContractUpgradedEvent {
    pub new_wasm_hash: BytesN<32>,
    pub timestamp: u64,
}

pub fn publish_contract_upgraded_event(env: &Env, new_wasm_hash: BytesN<32>, timestamp: u64) {
    ContractUpgradedEvent {
        new_wasm_hash,
        timestamp,
    }
    .publish(env);
}

// ── Credits ───────────────────────────────────────────────────────────────────

#[contractevent(topics = ["credits_refilled"])]
pub struct CreditsRefilledEvent {
    pub amount: u64,
    pub from_fees: bool,
    pub new_balance: u64,
    pub timestamp: u64,
}

pub fn publish_credits_refilled_event(
    env: &Env,
    amount: u64,
    from_fees: bool,
    new_balance: u64,
    timestamp: u64,
) {
    CreditsRefilledEvent {
        amount,
        from_fees,
        new_balance,
        timestamp,
    }
    .publish(env);
}

#[contractevent(topics = ["credits_low"])]
pub struct CreditsLowEvent {
    pub balance: u64,
    pub threshold: u64,
    pub status: u32,
}

pub fn publish_credits_low_event(env: &Env, balance: u64, threshold: u64, status: u32) {
    CreditsLowEvent {
        balance,
        threshold,
        status,
    }
    .publish(env);
}
