#![cfg(test)]

use super::mocks::{expected_message, setup, to_vec, MockSigner, MockSignerClient};
use crate::components::signing::build_message;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use soroban_sdk::{BytesN, Env, String};

#[test]
fn test_public_key_is_published() {
    let ctx = setup();
    let key = ctx.client.get_ed25519_public_key();
    assert_eq!(key.to_array(), ctx.public_key);
}

#[test]
fn test_message_layout() {
    let env = Env::default();
    let id = String::from_str(&env, "sub_A");
    let message = build_message(&env, &id, 1_700_000_000, 10_000_000);
    let bytes = to_vec(&message);

    assert_eq!(bytes.len(), 5 + 8 + 8);
    assert_eq!(&bytes[..5], b"sub_A");
    assert_eq!(&bytes[5..13], &1_700_000_000i64.to_le_bytes());
    assert_eq!(&bytes[13..], &10_000_000u64.to_le_bytes());
    assert_eq!(bytes, expected_message(&id, 1_700_000_000, 10_000_000));
}

#[test]
fn test_message_differs_per_timestamp() {
    let env = Env::default();
    let id = String::from_str(&env, "sub_A");
    let first = build_message(&env, &id, 100, 1);
    let second = build_message(&env, &id, 101, 1);
    assert_ne!(first, second);
}

#[test]
fn test_rotating_signing_service_updates_public_key() {
    let ctx = setup();
    let signing_key = SigningKey::generate(&mut OsRng);
    let signer_id = ctx.env.register(MockSigner, ());
    let signer = MockSignerClient::new(&ctx.env, &signer_id);
    signer.setup(&BytesN::from_array(&ctx.env, &signing_key.to_bytes()));

    ctx.client.set_signing_service(&ctx.admin, &signer_id);
    assert_eq!(
        ctx.client.get_ed25519_public_key().to_array(),
        signing_key.verifying_key().to_bytes()
    );
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #15)")]
fn test_signing_service_without_key_is_rejected() {
    let ctx = setup();
    let unconfigured = ctx.env.register(MockSigner, ());
    ctx.client.set_signing_service(&ctx.admin, &unconfigured);
}

#[test]
#[should_panic(expected = "HostError: Error(Contract, #1)")]
fn test_only_admin_sets_signing_service() {
    let ctx = setup();
    let signer = ctx.signer.address.clone();
    ctx.client.set_signing_service(&ctx.owner, &signer);
}
