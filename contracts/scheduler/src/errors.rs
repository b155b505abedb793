use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotAuthorized = 1,
    AlreadyInitialized = 2,
    NotInitialized = 3,
    InvalidSubscriptionId = 4,
    InvalidAddress = 5,
    InvalidAmount = 6,
    InvalidInterval = 7,
    DuplicateSubscription = 8,
    SubscriptionNotFound = 9,
    InvalidState = 10,
    RateLimited = 11,
    QuotaExceeded = 12,
    CapacityReached = 13,
    ResourceExhausted = 14,
    SigningFailed = 15,
    SettlementRejected = 16,
    SettlementUnreachable = 17,
    TimedOut = 18,
    PaymentInFlight = 19,
    LicenseNotFound = 20,
    LicenseExpired = 21,
    ProposalPending = 22,
    NoPendingProposal = 23,
    ProposalNotMatured = 24,
    LastAdmin = 25,
    CannotRemoveSelf = 26,
    RoleAlreadyGranted = 27,
    RoleNotGranted = 28,
    InvalidConfig = 29,
    OperationsHalted = 30,
    InvalidStartTime = 31,
}
