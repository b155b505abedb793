use crate::components::access_control;
use crate::events::publish_settlement_gateway_set_event;
use crate::types::{DataKey, PaymentAuthorization, PaymentFailure, SettlementStatus};
use soroban_sdk::{contractclient, log, Address, Env, String};

/// Gateway in front of the settlement program on the destination chain.
/// It verifies the signature, enforces the replay window and executes the
/// transfer.
#[contractclient(name = "SettlementGatewayClient")]
pub trait SettlementGateway {
    fn authorize_payment(env: Env, authorization: PaymentAuthorization) -> SettlementStatus;
    fn payment_status(env: Env, subscription_id: String, timestamp: u64) -> SettlementStatus;
}

pub fn configure(env: &Env, gateway: &Address) {
    env.storage()
        .instance()
        .set(&DataKey::SettlementGateway, gateway);
    publish_settlement_gateway_set_event(env, gateway.clone(), env.ledger().timestamp());
}

pub fn set_settlement_gateway(env: &Env, admin: &Address, gateway: &Address) {
    access_control::require_admin(env, admin);
    configure(env, gateway);
}

fn gateway(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::SettlementGateway)
}

/// Submits one authorization, resubmitting the same payload while the gateway
/// is unreachable. Returns the answer and the number of calls made.
pub fn submit(
    env: &Env,
    authorization: &PaymentAuthorization,
    max_attempts: u32,
) -> (Result<SettlementStatus, PaymentFailure>, u32) {
    let Some(gateway) = gateway(env) else {
        return (Err(PaymentFailure::SettlementUnreachable), 0);
    };
    let client = SettlementGatewayClient::new(env, &gateway);

    let mut attempts = 0;
    while attempts < max_attempts {
        attempts += 1;
        if let Ok(Ok(status)) = client.try_authorize_payment(authorization) {
            return (Ok(status), attempts);
        }
        log!(
            env,
            "gateway unreachable for {} (attempt {})",
            authorization.subscription_id,
            attempts
        );
    }
    (Err(PaymentFailure::SettlementUnreachable), attempts)
}

pub fn poll(
    env: &Env,
    subscription_id: &String,
    timestamp: u64,
) -> Result<SettlementStatus, PaymentFailure> {
    let gateway = gateway(env).ok_or(PaymentFailure::SettlementUnreachable)?;
    match SettlementGatewayClient::new(env, &gateway).try_payment_status(subscription_id, &timestamp)
    {
        Ok(Ok(status)) => Ok(status),
        _ => Err(PaymentFailure::SettlementUnreachable),
    }
}
