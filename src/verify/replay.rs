//! Per-author replay protection on top of [`verify_decoded`].

// self
use crate::{
	_prelude::*,
	codec,
	message::MessageVerifier,
	obs::Rejection,
	token::Token,
	verify::{self, verify_decoded},
};

/// Number of distinct authors a [`ReplayGuard`] built with [`ReplayGuard::new`] will track.
pub const DEFAULT_MAX_AUTHORS: usize = 4_096;

/// Remembers the last accepted sequence number of every author and admits only newer tokens.
///
/// A token is recorded only after its signature verifies, and the floor is re-checked under the
/// lock before recording, so two concurrent admissions of the same `(author, seq)` cannot both
/// succeed.
///
/// Floors are kept for at most `max_authors` distinct authors. Once the guard is full, tokens
/// from authors it has never seen are refused; known authors keep being admitted. An
/// unpinned verifier lets any caller mint a fresh `did:key`, so the bound is what keeps the
/// map from growing without limit.
pub struct ReplayGuard {
	verifier: Arc<dyn MessageVerifier>,
	max_authors: usize,
	last_seen: Mutex<HashMap<String, u64>>,
}
impl ReplayGuard {
	/// Creates an empty guard around `verifier` tracking up to [`DEFAULT_MAX_AUTHORS`] authors.
	pub fn new(verifier: Arc<dyn MessageVerifier>) -> Self {
		Self::with_capacity(verifier, DEFAULT_MAX_AUTHORS)
	}

	/// Creates an empty guard that tracks at most `max_authors` distinct authors.
	pub fn with_capacity(verifier: Arc<dyn MessageVerifier>, max_authors: usize) -> Self {
		Self { verifier, max_authors, last_seen: Mutex::new(HashMap::new()) }
	}

	/// Maximum number of distinct authors this guard tracks.
	pub fn max_authors(&self) -> usize {
		self.max_authors
	}

	/// Number of authors currently tracked.
	pub fn tracked_authors(&self) -> usize {
		self.last_seen.lock().len()
	}

	/// Restores a floor for `author`, e.g. from a persisted snapshot. Floors never move down.
	///
	/// Seeding is an operator action and is not limited by `max_authors`.
	pub fn seed(&self, author: impl Into<String>, seq: u64) {
		let mut last_seen = self.last_seen.lock();
		let floor = last_seen.entry(author.into()).or_insert(seq);

		*floor = (*floor).max(seq);
	}

	/// Last accepted sequence number for `author`.
	pub fn last_seen(&self, author: &str) -> Option<u64> {
		self.last_seen.lock().get(author).copied()
	}

	/// Decodes, verifies, and records a `Bearer` header.
	pub async fn admit(&self, header: &str) -> bool {
		match codec::decode_header(header) {
			Ok(token) => self.admit_decoded(&token).await,
			Err(_) => verify::reject(Rejection::Malformed),
		}
	}

	/// Verifies and records an already-decoded token.
	pub async fn admit_decoded(&self, token: &Token) -> bool {
		let floor = {
			let last_seen = self.last_seen.lock();

			match last_seen.get(&token.author) {
				Some(&floor) => Some(floor),
				None if last_seen.len() >= self.max_authors =>
					return verify::reject(Rejection::Capacity),
				None => None,
			}
		};

		if !verify_decoded(self.verifier.as_ref(), token, floor).await {
			return false;
		}

		let mut last_seen = self.last_seen.lock();

		match last_seen.get(&token.author) {
			Some(&last) if token.seq <= last => verify::reject(Rejection::Stale),
			None if last_seen.len() >= self.max_authors => verify::reject(Rejection::Capacity),
			_ => {
				last_seen.insert(token.author.clone(), token.seq);

				true
			},
		}
	}
}
impl Debug for ReplayGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReplayGuard")
			.field("authors", &self.tracked_authors())
			.field("max_authors", &self.max_authors)
			.finish()
	}
}
