// crates.io
use rand::RngCore;
use zeroize::Zeroizing;
// self
use crate::{
	_prelude::*,
	aead::CipherKind,
	error::ArgumentError,
	protocol::{IssuanceRequest, request::validate_batch_count},
	token::{
		BatchKey, BatchTimestamp, RandomPool, TIMESTAMP_LEN, TOKENS_PER_BATCH_UNIT, Token,
	},
	transport::ByteStream,
};

/// Issuer response: optional batch key, batch timestamp, and the random pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedBatch {
	/// Batch count the response was sized for.
	pub batch_count: u8,
	/// Cipher negotiated for the batch.
	pub cipher: CipherKind,
	/// Batch key, present iff `cipher` enables encryption.
	pub key: Option<BatchKey>,
	/// Timestamp shared by every token.
	pub timestamp: BatchTimestamp,
	/// Six random bytes per token.
	pub pool: RandomPool,
}
impl IssuedBatch {
	/// Tokens carried by the batch.
	pub fn token_count(&self) -> Result<u16, ArgumentError> {
		validate_batch_count(self.batch_count)?;

		// At most 31 * 16.
		Ok(u16::from(self.batch_count) * TOKENS_PER_BATCH_UNIT as u16)
	}

	/// Returns the token at `index`, if the pool holds one.
	pub fn token(&self, index: usize) -> Option<Token> {
		self.pool.slice(index).map(|random| Token::new(&self.timestamp, &random))
	}

	/// Reads the response to `request` from `stream`.
	///
	/// Key and pool buffers are reserved up front; an allocation failure surfaces as
	/// [`Error::OutOfMemory`] before any byte is read into them.
	pub fn read_from<S>(stream: &mut S, request: &IssuanceRequest) -> Result<Self>
	where
		S: ?Sized + ByteStream,
	{
		request.validate()?;

		let key = if request.cipher.is_encryption_enabled() {
			let mut key = zeroed(request.cipher.key_len())?;

			stream.read_exact(&mut key)?;

			Some(BatchKey::from(key))
		} else {
			None
		};
		let mut timestamp = [0; TIMESTAMP_LEN];

		stream.read_exact(&mut timestamp)?;

		let mut pool = zeroed(request.pool_len())?;

		stream.read_exact(&mut pool)?;

		Ok(Self {
			batch_count: request.batch_count,
			cipher: request.cipher,
			key,
			timestamp: BatchTimestamp(timestamp),
			pool: RandomPool::from(pool),
		})
	}

	/// Generates a fresh batch for `request`, as the issuer does.
	///
	/// The timestamp is bits 8..56 of the Unix-nanosecond clock at `now`; key and pool come from
	/// the thread-local CSPRNG.
	pub fn mint(request: &IssuanceRequest, now: OffsetDateTime) -> Result<Self> {
		request.validate()?;

		let mut rng = rand::rng();
		let key = if request.cipher.is_encryption_enabled() {
			let mut key = zeroed(request.cipher.key_len())?;

			rng.fill_bytes(&mut key);

			Some(BatchKey::from(key))
		} else {
			None
		};
		let mut pool = zeroed(request.pool_len())?;

		rng.fill_bytes(&mut pool);

		Ok(Self {
			batch_count: request.batch_count,
			cipher: request.cipher,
			key,
			timestamp: timestamp_at(now),
			pool: RandomPool::from(pool),
		})
	}

	/// Writes the response frame to `stream` in a single write.
	pub fn write_to<S>(&self, stream: &mut S) -> Result<()>
	where
		S: ?Sized + ByteStream,
	{
		let key = self.key.as_ref().map_or(&[][..], BatchKey::expose);
		let len = key.len() + TIMESTAMP_LEN + self.pool.len();
		let mut frame = Zeroizing::new(Vec::new());

		frame.try_reserve_exact(len).map_err(|_| Error::OutOfMemory { requested: len })?;
		frame.extend_from_slice(key);
		frame.extend_from_slice(self.timestamp.as_bytes());
		frame.extend_from_slice(self.pool.expose());
		stream.write_all(&frame)?;

		Ok(())
	}
}

/// Derives the batch timestamp for `now`.
pub fn timestamp_at(now: OffsetDateTime) -> BatchTimestamp {
	let shifted = (now.unix_timestamp_nanos() >> 8) as u64 & 0xFFFF_FFFF_FFFF;
	let mut timestamp = [0; TIMESTAMP_LEN];

	timestamp.copy_from_slice(&shifted.to_be_bytes()[8 - TIMESTAMP_LEN..]);

	BatchTimestamp(timestamp)
}

fn zeroed(len: usize) -> Result<Zeroizing<Vec<u8>>> {
	let mut buf = Vec::new();

	buf.try_reserve_exact(len).map_err(|_| Error::OutOfMemory { requested: len })?;
	buf.resize(len, 0);

	Ok(Zeroizing::new(buf))
}
