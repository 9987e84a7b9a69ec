//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// self
use signed_bearer::{message::Ed25519Signer, token::Claims};

/// Builds a deterministic Ed25519 signer from a single repeated seed byte.
pub fn test_signer(seed: u8) -> Arc<Ed25519Signer> {
	Arc::new(Ed25519Signer::from_bytes(&[seed; 32]))
}

/// Extra claims used across tests (`{"username": "alice"}`).
pub fn test_claims() -> Claims {
	Claims::new().with("username", "alice").expect("Fixture claims should not use reserved keys.")
}
