//! Crate-level error types shared across the codec, factories, stores, and the signed client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Verification never surfaces this type; it resolves to `false` instead. Creation paths
/// (tokens, headers, signed requests) return it so callers can tell "could not produce a
/// credential" apart from "produced an invalid one".
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure while reading or persisting the sequence counter.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The signing primitive refused to produce a signature.
	#[error(transparent)]
	Signing(#[from] crate::message::SigningError),
	/// A header or bare token could not be decoded.
	#[error(transparent)]
	Decode(#[from] crate::codec::DecodeError),
	/// A token could not be serialized.
	#[error(transparent)]
	Encode(#[from] crate::codec::EncodeError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Sequence numbers start at 1; zero is never signed.
	#[error("Sequence number must be positive.")]
	ZeroSequence,
	/// The counter reached the largest representable value.
	#[error("Sequence counter is exhausted at {last}.")]
	SequenceExhausted {
		/// Last sequence number that was issued.
		last: u64,
	},
	/// Extra claims collide with reserved envelope fields or are not a JSON object.
	#[error("Extra claims are invalid.")]
	InvalidClaims(#[from] crate::token::ClaimsError),
	/// HTTP request construction failed.
	#[error("HTTP request could not be constructed.")]
	InvalidRequest {
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
	/// The minted header is not a valid HTTP header value.
	#[cfg(feature = "reqwest")]
	#[error("Authorization header value is invalid.")]
	InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}
impl ConfigError {
	/// Wraps a request builder failure inside [`ConfigError`].
	pub fn invalid_request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::InvalidRequest { source: Box::new(src) }
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending a signed request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
