//! Signing primitive contracts.
//!
//! The crate never touches key material directly. A [`MessageSigner`] turns a [`Payload`] into a
//! signed [`Token`], and a [`MessageVerifier`] checks a token's signature. Both return boxed
//! futures so hardware keys, remote signing services, or browser-style async crypto can sit
//! behind the same seam as the in-process Ed25519 adapter.

#[cfg(feature = "ed25519")] pub mod ed25519;
#[cfg(feature = "ed25519")] pub use ed25519::*;

// self
use crate::{
	_prelude::*,
	error::BoxError,
	token::{Payload, Token},
};

/// Boxed future returned by [`MessageSigner::create`].
pub type SignFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SigningError>> + 'a + Send>>;

/// Boxed future returned by [`MessageVerifier::verify`].
pub type VerifyFuture<'a> = Pin<Box<dyn Future<Output = bool> + 'a + Send>>;

/// Produces signed envelopes for a single identity.
pub trait MessageSigner
where
	Self: Send + Sync,
{
	/// Signs `payload`, returning the token with `author` and `signature` attached.
	///
	/// Implementations must sign [`Payload::signable_bytes`] for their author string so any
	/// [`MessageVerifier`] can recompute the same bytes from the decoded token.
	fn create(&self, payload: Payload) -> SignFuture<'_, Token>;
}

/// Checks the signature of a decoded envelope.
pub trait MessageVerifier
where
	Self: Send + Sync,
{
	/// Resolves to `true` only when the signature is valid for the token's author.
	///
	/// Implementations must never panic on hostile input; unknown authors and malformed
	/// signatures resolve to `false`.
	fn verify<'a>(&'a self, token: &'a Token) -> VerifyFuture<'a>;
}

impl<T> MessageSigner for Arc<T>
where
	T: MessageSigner + ?Sized,
{
	fn create(&self, payload: Payload) -> SignFuture<'_, Token> {
		(**self).create(payload)
	}
}
impl<T> MessageVerifier for Arc<T>
where
	T: MessageVerifier + ?Sized,
{
	fn verify<'a>(&'a self, token: &'a Token) -> VerifyFuture<'a> {
		(**self).verify(token)
	}
}

/// Failures reported by a [`MessageSigner`].
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// The signer refused the keypair or payload.
	#[error("Signer rejected the payload: {reason}.")]
	Rejected {
		/// Signer-supplied reason string.
		reason: String,
	},
	/// The payload could not be serialized into its signable form.
	#[error("Payload could not be serialized for signing.")]
	Payload(#[from] serde_json::Error),
	/// Backend failure (remote signer, HSM, keystore).
	#[error("Signing backend failed.")]
	Backend {
		/// Backend-specific failure.
		#[source]
		source: BoxError,
	},
}
impl SigningError {
	/// Wraps a backend-specific failure.
	pub fn backend(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Backend { source: Box::new(src) }
	}
}
