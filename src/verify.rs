//! Inbound verification: decode, check freshness, then check the signature.
//!
//! Verification is total. Every entry point resolves to a `bool`; malformed input, stale
//! sequence numbers, and bad signatures are all reported as `false` so callers can treat
//! "invalid" and "unverifiable" the same way.

mod replay;

pub use replay::*;

// self
use crate::{
	codec,
	message::MessageVerifier,
	obs::{self, OpKind, OpOutcome, OpSpan, Rejection},
	token::Token,
};

/// Whether `seq` is strictly newer than the last accepted sequence number.
///
/// Replaying exactly `min_seq` is rejected.
pub fn is_fresh(seq: u64, min_seq: Option<u64>) -> bool {
	min_seq.is_none_or(|min| seq > min)
}

/// Verifies a `Bearer <token>` header value.
///
/// When `min_seq` is supplied, tokens with `seq <= min_seq` are rejected without consulting the
/// signing primitive.
pub async fn verify<V>(verifier: &V, header: &str, min_seq: Option<u64>) -> bool
where
	V: MessageVerifier + ?Sized,
{
	match codec::decode_header(header) {
		Ok(token) => verify_decoded(verifier, &token, min_seq).await,
		Err(_) => reject(Rejection::Malformed),
	}
}

/// Verifies a bare base64 token string (no `Bearer` prefix).
pub async fn verify_token<V>(verifier: &V, token: &str, min_seq: Option<u64>) -> bool
where
	V: MessageVerifier + ?Sized,
{
	match codec::decode_token(token) {
		Ok(token) => verify_decoded(verifier, &token, min_seq).await,
		Err(_) => reject(Rejection::Malformed),
	}
}

/// Verifies an already-decoded token, applying the same freshness short-circuit.
pub async fn verify_decoded<V>(verifier: &V, token: &Token, min_seq: Option<u64>) -> bool
where
	V: MessageVerifier + ?Sized,
{
	if !is_fresh(token.seq, min_seq) {
		return reject(Rejection::Stale);
	}

	let span = OpSpan::new(OpKind::Verify, "verify_decoded");

	obs::record_op_outcome(OpKind::Verify, OpOutcome::Attempt);

	if span.instrument(verifier.verify(token)).await {
		obs::record_op_outcome(OpKind::Verify, OpOutcome::Success);

		true
	} else {
		reject(Rejection::BadSignature)
	}
}

pub(crate) fn reject(reason: Rejection) -> bool {
	obs::record_op_outcome(OpKind::Verify, OpOutcome::Failure);
	obs::record_rejection(reason);

	false
}


#[cfg(all(test, feature = "ed25519"))]
mod ed25519_tests {
	// self
	use super::*;
	use crate::{
		factory,
		message::{Ed25519Signer, Ed25519Verifier},
		token::Claims,
	};

	#[tokio::test]
	async fn header_verification_honors_min_seq() {
		let signer = Ed25519Signer::from_bytes(&[3; 32]);
		let verifier = Ed25519Verifier::default();
		let header = factory::create_header(&signer, 7, &Claims::new())
			.await
			.expect("Header should mint.");

		assert!(verify(&verifier, &header, None).await);
		assert!(verify(&verifier, &header, Some(6)).await);
		assert!(!verify(&verifier, &header, Some(7)).await);
		assert!(!verify(&verifier, &header, Some(8)).await);
	}

	#[tokio::test]
	async fn malformed_input_is_false() {
		let verifier = Ed25519Verifier::default();

		assert!(!verify(&verifier, "Bearer not-valid-base64", None).await);
		assert!(!verify(&verifier, "Bearer balnoey", None).await);
		assert!(!verify(&verifier, "", None).await);
		assert!(!verify_token(&verifier, "%%%", None).await);
	}
}
