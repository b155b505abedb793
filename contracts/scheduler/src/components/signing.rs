use crate::components::access_control;
use crate::errors::ContractError;
use crate::events::publish_signing_service_set_event;
use crate::types::{DataKey, PaymentFailure};
use soroban_sdk::{contractclient, panic_with_error, Address, Bytes, BytesN, Env, String};

/// Longest subscription id accepted by the registry.
const MAX_ID_BYTES: usize = 64;

/// Threshold-signature service holding the scheduler's Ed25519 key.
#[contractclient(name = "SigningServiceClient")]
pub trait SigningService {
    fn sign(env: Env, message: Bytes) -> BytesN<64>;
    fn public_key(env: Env) -> BytesN<32>;
}

/// Builds the message the settlement program verifies.
///
/// Format: [subscription_id utf-8 bytes, timestamp as i64 LE, amount as u64 LE]
pub fn build_message(env: &Env, subscription_id: &String, timestamp: u64, amount: u64) -> Bytes {
    let len = (subscription_id.len() as usize).min(MAX_ID_BYTES);
    let mut id_bytes = [0u8; MAX_ID_BYTES];
    subscription_id.copy_into_slice(&mut id_bytes[..len]);

    let mut msg = Bytes::from_slice(env, &id_bytes[..len]);
    msg.extend_from_slice(&(timestamp as i64).to_le_bytes());
    msg.extend_from_slice(&amount.to_le_bytes());
    msg
}

fn service(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::SigningService)
}

/// Points the scheduler at a signing service and caches its public key.
/// Panics with `SigningFailed` when the service cannot produce one.
pub fn configure(env: &Env, service: &Address) {
    let public_key = match SigningServiceClient::new(env, service).try_public_key() {
        Ok(Ok(key)) => key,
        _ => panic_with_error!(env, ContractError::SigningFailed),
    };
    env.storage()
        .instance()
        .set(&DataKey::SigningService, service);
    env.storage()
        .instance()
        .set(&DataKey::SignerPublicKey, &public_key);

    publish_signing_service_set_event(
        env,
        service.clone(),
        public_key,
        env.ledger().timestamp(),
    );
}

pub fn set_signing_service(env: &Env, admin: &Address, service: &Address) {
    access_control::require_admin(env, admin);
    configure(env, service);
}

pub fn get_public_key(env: &Env) -> BytesN<32> {
    env.storage()
        .instance()
        .get(&DataKey::SignerPublicKey)
        .unwrap_or_else(|| panic_with_error!(env, ContractError::NotInitialized))
}

pub fn sign(env: &Env, message: &Bytes) -> Result<BytesN<64>, PaymentFailure> {
    let service = service(env).ok_or(PaymentFailure::SigningFailed)?;
    match SigningServiceClient::new(env, &service).try_sign(message) {
        Ok(Ok(signature)) => Ok(signature),
        _ => Err(PaymentFailure::SigningFailed),
    }
}
