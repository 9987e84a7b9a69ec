//! Monotonic sequence counters, either ephemeral or backed by a [`KeyValueStore`].
//!
//! A [`SequenceStore`] is resolved once from a [`SequenceSource`] and then handed (usually via
//! `Arc`) to whichever factory or client mints tokens. Every call to [`SequenceStore::next`]
//! reads, increments, and persists under one lock, so tasks and threads sharing a store never
//! observe the same value. Two processes sharing one persistent key are not coordinated: the
//! `get`/`set` pair is not transactional, and each key must have exactly one owner.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	obs,
	store::{KeyValueStore, StoreError},
};

/// Storage key used when none is configured.
pub const DEFAULT_SEQUENCE_KEY: &str = "__seq";

/// Parses a stored counter value.
///
/// Absent, empty, or non-integer values become `0`. This is best-effort recovery: a corrupted
/// counter restarts the sequence instead of blocking every future request.
pub fn parse_sequence(raw: Option<&str>) -> u64 {
	raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

/// Persistent store plus the key the counter lives under.
#[derive(Clone)]
pub struct StoreHandle {
	/// Backing key/value store.
	pub store: Arc<dyn KeyValueStore>,
	/// Key holding the decimal counter.
	pub key: String,
}
impl StoreHandle {
	/// Uses [`DEFAULT_SEQUENCE_KEY`] in the provided store.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self { store, key: DEFAULT_SEQUENCE_KEY.to_owned() }
	}

	/// Overrides the storage key.
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = key.into();

		self
	}
}
impl Debug for StoreHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StoreHandle").field("key", &self.key).finish_non_exhaustive()
	}
}

/// Where a counter starts from.
#[derive(Clone, Debug)]
pub enum SequenceSource {
	/// Ephemeral counter; the value is the last sequence considered used, so the first issued
	/// sequence is `start + 1`.
	Fixed(u64),
	/// Counter persisted in a key/value store and re-read at construction.
	Persistent(StoreHandle),
}
impl SequenceSource {
	/// Persistent source using [`DEFAULT_SEQUENCE_KEY`].
	pub fn persistent(store: Arc<dyn KeyValueStore>) -> Self {
		Self::Persistent(StoreHandle::new(store))
	}
}
impl Default for SequenceSource {
	fn default() -> Self {
		Self::Fixed(0)
	}
}
impl From<u64> for SequenceSource {
	fn from(start: u64) -> Self {
		Self::Fixed(start)
	}
}
impl From<StoreHandle> for SequenceSource {
	fn from(handle: StoreHandle) -> Self {
		Self::Persistent(handle)
	}
}

/// Strictly increasing counter shared by everything that signs for one identity.
#[derive(Debug)]
pub struct SequenceStore {
	current: Mutex<u64>,
	backing: Option<StoreHandle>,
}
impl SequenceStore {
	/// Ephemeral counter whose first issued value is `start + 1`.
	pub fn ephemeral(start: u64) -> Self {
		Self { current: Mutex::new(start), backing: None }
	}

	/// Counter seeded from, and persisted to, `handle`.
	///
	/// Unparsable stored values restart at `0`; backend read failures are returned.
	pub fn persistent(handle: StoreHandle) -> Result<Self, StoreError> {
		let raw = handle.store.get(&handle.key)?;
		let start = parse_sequence(raw.as_deref());
		let corrupt = raw
			.as_deref()
			.map(str::trim)
			.is_some_and(|value| !value.is_empty() && value.parse::<u64>().is_err());

		if corrupt {
			obs::warn_sequence_reset(&handle.key);
		}

		Ok(Self { current: Mutex::new(start), backing: Some(handle) })
	}

	/// Resolves a [`SequenceSource`] into a live counter.
	pub fn from_source(source: SequenceSource) -> Result<Self, StoreError> {
		match source {
			SequenceSource::Fixed(start) => Ok(Self::ephemeral(start)),
			SequenceSource::Persistent(handle) => Self::persistent(handle),
		}
	}

	/// Last issued value (or the starting value before the first call to [`next`](Self::next)).
	pub fn current(&self) -> u64 {
		*self.current.lock()
	}

	/// Whether the counter is written through to a store.
	pub fn is_persistent(&self) -> bool {
		self.backing.is_some()
	}

	/// Increments, persists, and returns the next sequence number.
	///
	/// The counter is never decremented: when persisting fails, the in-memory value keeps the
	/// increment and the store error is returned.
	pub fn next(&self) -> Result<u64> {
		let mut current = self.current.lock();
		let next =
			current.checked_add(1).ok_or(ConfigError::SequenceExhausted { last: *current })?;

		*current = next;

		if let Some(handle) = &self.backing {
			handle.store.set(&handle.key, &next.to_string())?;
		}

		Ok(next)
	}
}
