//! Optional observability helpers for signing and verification.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `signed_bearer.op` with the `op` and
//!   `stage` fields, plus a `warn` event whenever a stored counter had to be reset.
//! - Enable `metrics` to increment `signed_bearer_op_total` (labeled by `op` + `outcome`) and
//!   `signed_bearer_rejection_total` (labeled by `reason`).

mod counter;
mod trace;

pub use counter::*;
pub use trace::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Minting a token or header.
	Sign,
	/// Sending a signed HTTP request.
	Send,
	/// Verifying a token or header.
	Verify,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Sign => "sign",
			OpKind::Send => "send",
			OpKind::Verify => "verify",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a helper.
	Attempt,
	/// Successful completion (for verification: the token was accepted).
	Success,
	/// Failure propagated back to the caller (for verification: the token was rejected).
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why a verifier rejected a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
	/// The header or token could not be decoded.
	Malformed,
	/// The sequence number was not above the last accepted one.
	Stale,
	/// The signing primitive refused the signature.
	BadSignature,
	/// A replay guard is full and the author is not one it already tracks.
	Capacity,
}
impl Rejection {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Rejection::Malformed => "malformed",
			Rejection::Stale => "stale",
			Rejection::BadSignature => "bad_signature",
			Rejection::Capacity => "capacity",
		}
	}
}
impl Display for Rejection {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
