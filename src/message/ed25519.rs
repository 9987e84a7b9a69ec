//! In-process Ed25519 signer and verifier using `did:key` author strings.
//!
//! Authors are encoded as `did:key:u<base64url(0xed 0x01 || public key)>`: the multicodec
//! prefix for an Ed25519 public key, multibase-encoded with the unpadded URL-safe alphabet.

// crates.io
use base64::{
	Engine,
	engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::Rng;
// self
use crate::{
	_prelude::*,
	message::{MessageSigner, MessageVerifier, SignFuture, SigningError, VerifyFuture},
	token::{Payload, Token},
};

const DID_KEY_PREFIX: &str = "did:key:u";
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Signs envelopes with an Ed25519 key held in memory.
#[derive(Clone)]
pub struct Ed25519Signer {
	key: SigningKey,
	author: String,
}
impl Ed25519Signer {
	/// Wraps an existing signing key.
	pub fn new(key: SigningKey) -> Self {
		let author = did_key(&key.verifying_key());

		Self { key, author }
	}

	/// Builds a signer from raw secret key bytes.
	pub fn from_bytes(bytes: &[u8; 32]) -> Self {
		Self::new(SigningKey::from_bytes(bytes))
	}

	/// Builds a signer with a freshly generated key.
	pub fn generate() -> Self {
		let mut bytes = [0_u8; 32];

		rand::rng().fill(&mut bytes);

		Self::from_bytes(&bytes)
	}

	/// `did:key` identity written into every token's `author` field.
	pub fn author(&self) -> &str {
		&self.author
	}

	/// Public half of the keypair.
	pub fn verifying_key(&self) -> VerifyingKey {
		self.key.verifying_key()
	}

	fn sign_now(&self, payload: Payload) -> Result<Token, SigningError> {
		let bytes = payload.signable_bytes(&self.author)?;
		let signature = self.key.sign(&bytes);

		Ok(payload.into_token(self.author.clone(), STANDARD.encode(signature.to_bytes())))
	}
}
impl MessageSigner for Ed25519Signer {
	fn create(&self, payload: Payload) -> SignFuture<'_, Token> {
		Box::pin(async move { self.sign_now(payload) })
	}
}
impl Debug for Ed25519Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Ed25519Signer").field("author", &self.author).finish_non_exhaustive()
	}
}

/// Verifies envelopes signed by [`Ed25519Signer`] (or any signer using the same author format).
///
/// The default verifier trusts whichever key the `did:key` author names, so it proves possession
/// of that key and nothing more. Use [`Ed25519Verifier::pinned`] when the expected peer is known.
#[derive(Clone, Debug, Default)]
pub struct Ed25519Verifier {
	pinned: Option<VerifyingKey>,
}
impl Ed25519Verifier {
	/// Accepts only tokens whose author resolves to `key`.
	pub fn pinned(key: VerifyingKey) -> Self {
		Self { pinned: Some(key) }
	}

	fn verify_now(&self, token: &Token) -> bool {
		let Some(key) = parse_did_key(&token.author) else {
			return false;
		};

		if self.pinned.is_some_and(|pinned| pinned != key) {
			return false;
		}

		let Ok(raw) = STANDARD.decode(&token.signature) else {
			return false;
		};
		let Ok(signature) = Signature::from_slice(&raw) else {
			return false;
		};
		let Ok(bytes) = token.signable_bytes() else {
			return false;
		};

		key.verify_strict(&bytes, &signature).is_ok()
	}
}
impl MessageVerifier for Ed25519Verifier {
	fn verify<'a>(&'a self, token: &'a Token) -> VerifyFuture<'a> {
		Box::pin(async move { self.verify_now(token) })
	}
}

/// Renders the `did:key` author string for a public key.
pub fn did_key(key: &VerifyingKey) -> String {
	let mut bytes = Vec::with_capacity(ED25519_MULTICODEC.len() + 32);

	bytes.extend_from_slice(&ED25519_MULTICODEC);
	bytes.extend_from_slice(key.as_bytes());

	format!("{DID_KEY_PREFIX}{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Resolves a `did:key` author string back into a public key.
pub fn parse_did_key(author: &str) -> Option<VerifyingKey> {
	let encoded = author.strip_prefix(DID_KEY_PREFIX)?;
	let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
	let raw = bytes.strip_prefix(&ED25519_MULTICODEC)?;
	let raw: &[u8; 32] = raw.try_into().ok()?;

	VerifyingKey::from_bytes(raw).ok()
}
