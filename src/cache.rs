//! Per-(channel, direction) token cache.
//!
//! The cache owns one [`CacheEntry`] per unique key. Installing a batch replaces the previous
//! entry wholesale, so a consumer never observes a half-written batch and the old key and pool
//! are zeroized as soon as they are dropped.

mod entry;

pub use entry::*;

// self
use crate::{
	_prelude::*,
	aead::CipherKind,
	error::ArgumentError,
	protocol::IssuedBatch,
	token::{ChannelName, Direction, IssuedToken, RANDOM_BYTES_LEN},
};

/// Why an entry must be refilled before the next token can be consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefillReason {
	/// No batch has been installed for the key.
	Missing,
	/// Every token of the installed batch was handed out.
	Exhausted,
	/// The installed batch was issued for another cipher than the one requested.
	CipherChanged,
	/// The installed batch outlived the configured lifetime.
	Stale,
}
impl RefillReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefillReason::Missing => "missing",
			RefillReason::Exhausted => "exhausted",
			RefillReason::CipherChanged => "cipher_changed",
			RefillReason::Stale => "stale",
		}
	}
}
impl Display for RefillReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// In-memory store of token batches keyed by (channel, direction).
///
/// Each direction has its own map, so lookups borrow the channel as `&str`.
#[derive(Debug, Default)]
pub struct TokenCache {
	publish: HashMap<ChannelName, CacheEntry>,
	subscribe: HashMap<ChannelName, CacheEntry>,
}
impl TokenCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the entry for `(channel, direction)`, if one is installed.
	pub fn lookup(&self, channel: &str, direction: Direction) -> Option<&CacheEntry> {
		self.entries(direction).get(channel)
	}

	/// Returns `true` when `entry` is absent or exhausted.
	pub fn needs_refill(entry: Option<&CacheEntry>) -> bool {
		entry.is_none_or(CacheEntry::is_exhausted)
	}

	/// Classifies why `entry` cannot serve a `cipher` token at `now`, or returns `None` when it
	/// can. A `lifetime` of `None` disables expiry.
	pub fn refill_reason(
		entry: Option<&CacheEntry>,
		cipher: CipherKind,
		now: OffsetDateTime,
		lifetime: Option<Duration>,
	) -> Option<RefillReason> {
		match entry {
			None => Some(RefillReason::Missing),
			Some(entry) if entry.is_exhausted() => Some(RefillReason::Exhausted),
			Some(entry) if entry.cipher() != cipher => Some(RefillReason::CipherChanged),
			Some(entry) if lifetime.is_some_and(|lifetime| entry.is_stale_at(now, lifetime)) =>
				Some(RefillReason::Stale),
			Some(_) => None,
		}
	}

	/// Installs `batch` for `(channel, direction)`, replacing any previous entry.
	///
	/// The batch is validated first; on error the previous entry stays untouched.
	pub fn install(
		&mut self,
		channel: ChannelName,
		direction: Direction,
		batch: IssuedBatch,
		installed_at: OffsetDateTime,
	) -> Result<()> {
		let token_count = batch.token_count()?;
		let IssuedBatch { cipher, key, timestamp, pool, .. } = batch;
		let expected_pool = usize::from(token_count) * RANDOM_BYTES_LEN;

		if pool.len() != expected_pool {
			return Err(
				ArgumentError::PoolLength { expected: expected_pool, actual: pool.len() }.into()
			);
		}

		match (&key, cipher.is_encryption_enabled()) {
			(Some(key), true) if key.len() == cipher.key_len() => (),
			(None, false) => (),
			(key, _) => {
				return Err(ArgumentError::KeyMismatch {
					cipher,
					expected: cipher.key_len(),
					actual: key.as_ref().map_or(0, |key| key.len()),
				}
				.into());
			},
		}

		let entry = CacheEntry {
			channel: channel.clone(),
			direction,
			timestamp,
			pool,
			cursor: 0,
			token_count,
			cipher,
			key,
			installed_at,
		};

		self.entries_mut(direction).insert(channel, entry);

		Ok(())
	}

	/// Hands out the next token for `(channel, direction)` and advances the cursor.
	///
	/// Fails with [`Error::Exhausted`] when the entry is missing or depleted.
	pub fn consume(&mut self, channel: &str, direction: Direction) -> Result<IssuedToken> {
		let entry = self.entries_mut(direction).get_mut(channel).ok_or(Error::Exhausted)?;

		entry.take_next()
	}

	/// Returns the number of unconsumed tokens for `(channel, direction)`.
	pub fn remaining(&self, channel: &str, direction: Direction) -> usize {
		self.lookup(channel, direction).map_or(0, CacheEntry::remaining)
	}

	/// Number of installed entries.
	pub fn len(&self) -> usize {
		self.publish.len() + self.subscribe.len()
	}

	/// Returns `true` when no entry is installed.
	pub fn is_empty(&self) -> bool {
		self.publish.is_empty() && self.subscribe.is_empty()
	}

	/// Drops every entry, zeroizing keys and pools.
	pub fn clear(&mut self) {
		self.publish.clear();
		self.subscribe.clear();
	}

	fn entries(&self, direction: Direction) -> &HashMap<ChannelName, CacheEntry> {
		match direction {
			Direction::Publish => &self.publish,
			Direction::Subscribe => &self.subscribe,
		}
	}

	fn entries_mut(&mut self, direction: Direction) -> &mut HashMap<ChannelName, CacheEntry> {
		match direction {
			Direction::Publish => &mut self.publish,
			Direction::Subscribe => &mut self.subscribe,
		}
	}
}
