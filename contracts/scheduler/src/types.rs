use crate::errors::ContractError;
use soroban_sdk::{contracttype, Address, BytesN, String};

#[contracttype]
pub enum DataKey {
    Initialized,
    Config,
    Role(Address, Role),
    RoleMembers(Role),
    Subscription(String),
    SubscriptionIds,
    InFlight(String),
    License(BytesN<32>),
    LicenseActiveCount(BytesN<32>),
    ResourceLedger,
    FeeAddress,
    FeeProposal,
    SigningService,
    SignerPublicKey,
    SettlementGateway,
    OperationsHalted,
    Stats,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Admin,
    ControllerAdmin,
    ReadOnly,
    Keeper,
}

// ── Subscriptions ─────────────────────────────────────────────────────────────

/// Lifecycle state of a subscription.
///
/// - **Active**: eligible for triggering. Can move to `Paused`, `Cancelled`,
///   or `Expired` (one-time subscription confirmed).
/// - **Paused**: skipped by the scheduler. Can move to `Active` or `Cancelled`.
/// - **Cancelled** / **Expired**: terminal.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum SubscriptionStatus {
    Active = 0,
    Paused = 1,
    Cancelled = 2,
    Expired = 3,
}

impl SubscriptionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }
}

/// Structured reason returned by the settlement gateway when it refuses an
/// authorization.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RejectionReason {
    InvalidSignature = 0,
    StaleTimestamp = 1,
    InsufficientFunds = 2,
    Unauthorized = 3,
    Other = 4,
}

/// Why the last payment attempt of a subscription failed.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PaymentFailure {
    SigningFailed,
    SettlementUnreachable,
    SettlementRejected(RejectionReason),
    TimedOut,
}

impl PaymentFailure {
    pub fn as_error(&self) -> ContractError {
        match self {
            PaymentFailure::SigningFailed => ContractError::SigningFailed,
            PaymentFailure::SettlementUnreachable => ContractError::SettlementUnreachable,
            PaymentFailure::SettlementRejected(_) => ContractError::SettlementRejected,
            PaymentFailure::TimedOut => ContractError::TimedOut,
        }
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            PaymentFailure::SettlementRejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// A recurring (or one-time) payment authorized by the scheduler.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscription {
    pub id: String,
    /// Principal that created the subscription.
    pub owner: Address,
    /// sha256 of the api key the subscription was created under.
    pub license_id: BytesN<32>,
    /// Program on the settlement chain that executes the transfer.
    pub destination_program: String,
    pub subscriber: String,
    pub merchant: String,
    pub token_mint: String,
    /// Amount in the smallest unit of `token_mint`.
    pub amount: u64,
    /// Seconds between payments; `0` means one-time.
    pub interval_seconds: u64,
    pub start_time: Option<u64>,
    pub next_execution: u64,
    /// Backoff deadline after a failed attempt.
    pub retry_at: Option<u64>,
    pub status: SubscriptionStatus,
    pub created_at: u64,
    pub trigger_count: u64,
    pub failed_payment_count: u32,
    pub consecutive_failures: u32,
    pub last_triggered: Option<u64>,
    pub last_failure_time: Option<u64>,
    /// `ContractError` code of the last failed attempt.
    pub last_error: Option<u32>,
    /// `RejectionReason` code when the gateway refused the last attempt.
    pub last_rejection: Option<u32>,
    /// Retry budget exhausted; awaiting manual collection.
    pub overdue: bool,
    pub paused_by_emergency: bool,
    /// When the subscription entered `Cancelled` or `Expired`.
    pub terminal_at: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateSubscriptionRequest {
    pub subscription_id: String,
    pub destination_program: String,
    pub token_mint: String,
    pub amount: u64,
    pub subscriber: String,
    pub merchant: String,
    pub interval_seconds: u64,
    pub start_time: Option<u64>,
    pub api_key: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionFilter {
    /// `SubscriptionStatus` as `u32`.
    pub status: Option<u32>,
    pub merchant: Option<String>,
    pub subscriber: Option<String>,
    pub license_id: Option<BytesN<32>>,
    pub overdue_only: bool,
}

// ── Payment trigger ───────────────────────────────────────────────────────────

/// Payload handed to the settlement gateway.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentAuthorization {
    pub subscription_id: String,
    pub destination_program: String,
    pub amount: u64,
    pub token_mint: String,
    pub timestamp: u64,
    /// Last instant the destination may accept this signature.
    pub valid_until: u64,
    pub signature: BytesN<64>,
    pub subscriber: String,
    pub merchant: String,
}

/// Answer of the settlement gateway for a submitted authorization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SettlementStatus {
    Confirmed,
    Pending,
    Rejected(RejectionReason),
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TriggerPhase {
    Signing = 0,
    Submitted = 1,
}

/// Re-entrancy guard for a subscription with a signing/submission in flight.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InFlightPayment {
    pub subscription_id: String,
    pub phase: TriggerPhase,
    pub timestamp: u64,
    pub signature: Option<BytesN<64>>,
    pub submitted_tick: u64,
    pub submitted_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TriggerOutcome {
    Confirmed,
    Pending,
    Failed(PaymentFailure),
    /// The record vanished or became terminal while the call was in flight.
    Skipped,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub timestamp: u64,
    pub processed: u32,
    pub confirmed: u32,
    pub pending: u32,
    pub failed: u32,
    pub timed_out: u32,
    pub newly_overdue: u32,
    pub aborted: bool,
    pub health: HealthStatus,
}

// ── License gate ──────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LicenseTier {
    Community = 0,
    Beta = 1,
    Business = 2,
    Enterprise = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LicenseRecord {
    pub license_id: BytesN<32>,
    pub tier: LicenseTier,
    pub expires_at: u64,
    pub revoked: bool,
    pub created_at: u64,
    pub window_start: u64,
    pub window_count: u32,
    pub previous_window_count: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LicenseValidation {
    pub license_id: BytesN<32>,
    pub tier: LicenseTier,
    pub is_valid: bool,
    pub quota_remaining: u32,
    /// `None` when the tier has no per-license cap.
    pub max_subscriptions: Option<u32>,
    pub active_subscriptions: u32,
    pub expires_at: u64,
}

// ── Resource monitor ──────────────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum HealthStatus {
    Healthy = 0,
    Degraded = 1,
    Critical = 2,
    Offline = 3,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum DegradationReason {
    LowCredits = 0,
    CreditsExhausted = 1,
    StaleTick = 2,
    NoTickYet = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceLedger {
    pub current_balance: u64,
    pub threshold_balance: u64,
    pub auto_refill_enabled: bool,
    pub total_consumed: u64,
    pub total_refilled: u64,
    pub last_refill: Option<u64>,
    /// Credits earned from trigger fees, not yet moved into the balance.
    pub fee_pool: u64,
    pub last_tick_at: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceReport {
    pub current_balance: u64,
    pub threshold_balance: u64,
    pub auto_refill_enabled: bool,
    pub total_consumed: u64,
    pub total_refilled: u64,
    pub last_refill: Option<u64>,
    pub fee_pool: u64,
    pub classification: HealthStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchedulerStats {
    pub started_at: u64,
    pub total_ticks: u64,
    pub total_triggers: u64,
    pub total_failed_payments: u64,
    pub total_timeouts: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchedulerHealth {
    pub status: HealthStatus,
    /// `DegradationReason` as `u32`.
    pub degradation_reason: Option<u32>,
    pub uptime_seconds: u64,
    pub subscription_count: u32,
    pub active_count: u32,
    pub overdue_count: u32,
    pub in_flight_count: u32,
    pub failed_payments: u64,
    pub credit_balance: u64,
    pub last_tick_at: Option<u64>,
    pub operations_halted: bool,
}

// ── Governance ────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeAddressProposal {
    pub proposed_address: String,
    pub proposed_by: Address,
    pub proposed_at: u64,
    pub executable_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeGovernance {
    pub current_address: String,
    pub pending_address: Option<String>,
    pub proposed_by: Option<Address>,
    pub proposed_at: Option<u64>,
    pub executable_at: Option<u64>,
}

/// Tunable limits of the scheduler. Defaults live in `config.rs`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchedulerConfig {
    pub min_amount: u64,
    pub max_amount: u64,
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
    pub max_total_subscriptions: u32,
    pub max_consecutive_failures: u32,
    pub retry_base_delay_secs: u64,
    pub max_retry_delay_secs: u64,
    pub submit_attempts: u32,
    pub confirmation_timeout_ticks: u32,
    pub max_triggers_per_tick: u32,
    /// Replay window carried in every authorization as `valid_until`.
    pub signature_validity_secs: u64,
    pub fee_proposal_delay_secs: u64,
    pub tick_cost: u64,
    pub trigger_cost: u64,
    pub trigger_fee: u64,
    /// Share of each trigger fee credited to the refill pool (basis points).
    pub refill_ratio_bps: u32,
    pub degraded_after_secs: u64,
    pub offline_after_secs: u64,
    pub license_window_secs: u64,
}
