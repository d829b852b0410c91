// self
use crate::{
	_prelude::*,
	aead::CipherKind,
	token::{BatchKey, BatchTimestamp, ChannelName, Direction, IssuedToken, RandomPool, Token},
};

/// One installed token batch.
///
/// `cursor <= token_count` always holds, and `key` is present exactly when `cipher` enables
/// encryption, with the cipher's key length.
#[derive(Clone, Debug)]
pub struct CacheEntry {
	pub(crate) channel: ChannelName,
	pub(crate) direction: Direction,
	pub(crate) timestamp: BatchTimestamp,
	pub(crate) pool: RandomPool,
	pub(crate) cursor: u16,
	pub(crate) token_count: u16,
	pub(crate) cipher: CipherKind,
	pub(crate) key: Option<BatchKey>,
	pub(crate) installed_at: OffsetDateTime,
}
impl CacheEntry {
	/// Channel the batch was issued for.
	pub fn channel(&self) -> &ChannelName {
		&self.channel
	}

	/// Direction the batch authorizes.
	pub fn direction(&self) -> Direction {
		self.direction
	}

	/// Timestamp shared by every token in the batch.
	pub fn timestamp(&self) -> &BatchTimestamp {
		&self.timestamp
	}

	/// Index of the next token to hand out.
	pub fn cursor(&self) -> u16 {
		self.cursor
	}

	/// Total tokens in the batch.
	pub fn token_count(&self) -> u16 {
		self.token_count
	}

	/// Cipher negotiated for the batch.
	pub fn cipher(&self) -> CipherKind {
		self.cipher
	}

	/// Batch key, if the cipher enables encryption.
	pub fn key(&self) -> Option<&BatchKey> {
		self.key.as_ref()
	}

	/// Local instant the batch was installed.
	pub fn installed_at(&self) -> OffsetDateTime {
		self.installed_at
	}

	/// Tokens left before the batch is exhausted.
	pub fn remaining(&self) -> usize {
		usize::from(self.token_count.saturating_sub(self.cursor))
	}

	/// Returns `true` once every token was handed out.
	pub fn is_exhausted(&self) -> bool {
		self.cursor >= self.token_count
	}

	/// Returns `true` when the batch has been installed for at least `lifetime` at `now`.
	pub fn is_stale_at(&self, now: OffsetDateTime, lifetime: Duration) -> bool {
		now - self.installed_at >= lifetime
	}

	pub(crate) fn take_next(&mut self) -> Result<IssuedToken> {
		if self.is_exhausted() {
			return Err(Error::Exhausted);
		}

		let index = self.cursor;
		let random = self.pool.slice(usize::from(index)).ok_or(Error::Exhausted)?;

		self.cursor += 1;

		Ok(IssuedToken {
			token: Token::new(&self.timestamp, &random),
			cipher: self.cipher,
			key: self.key.clone(),
			index,
		})
	}
}
