//! Token model: channel identities, batch secrets, the 12-byte token, and its text encoding.

pub mod channel;
pub mod encode;
pub mod key;

pub use channel::*;
pub use key::*;

// self
use crate::{_prelude::*, aead::CipherKind};

/// Length of the issuer-assigned batch timestamp.
pub const TIMESTAMP_LEN: usize = 6;
/// Length of the per-token random slice.
pub const RANDOM_BYTES_LEN: usize = 6;
/// Length of a token (timestamp followed by a random slice).
pub const TOKEN_LEN: usize = TIMESTAMP_LEN + RANDOM_BYTES_LEN;
/// Tokens issued per unit of batch count.
pub const TOKENS_PER_BATCH_UNIT: usize = 16;
/// Length of an encoded token.
pub const ENCODED_TOKEN_LEN: usize = TOKEN_LEN.div_ceil(3) * 4;

/// Opaque timestamp shared by every token of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BatchTimestamp(pub [u8; TIMESTAMP_LEN]);
impl BatchTimestamp {
	/// Returns the raw timestamp bytes.
	pub const fn as_bytes(&self) -> &[u8; TIMESTAMP_LEN] {
		&self.0
	}
}

/// Single-use 12-byte channel token.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token([u8; TOKEN_LEN]);
impl Token {
	/// Joins a batch timestamp with one random slice.
	pub fn new(timestamp: &BatchTimestamp, random: &[u8; RANDOM_BYTES_LEN]) -> Self {
		let mut bytes = [0; TOKEN_LEN];

		bytes[..TIMESTAMP_LEN].copy_from_slice(timestamp.as_bytes());
		bytes[TIMESTAMP_LEN..].copy_from_slice(random);

		Self(bytes)
	}

	/// Wraps raw token bytes.
	pub const fn from_bytes(bytes: [u8; TOKEN_LEN]) -> Self {
		Self(bytes)
	}

	/// Returns the raw token bytes.
	pub const fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
		&self.0
	}

	/// Returns the batch timestamp half of the token.
	pub fn timestamp(&self) -> BatchTimestamp {
		let mut bytes = [0; TIMESTAMP_LEN];

		bytes.copy_from_slice(&self.0[..TIMESTAMP_LEN]);

		BatchTimestamp(bytes)
	}

	/// Returns the random half of the token.
	pub fn random(&self) -> &[u8] {
		&self.0[TIMESTAMP_LEN..]
	}

	/// Encodes the token as a URL-safe channel name.
	pub fn encode(&self) -> String {
		encode::encode_token(&self.0)
	}

	/// Parses an encoded token.
	pub fn decode(text: &str) -> Result<Self, crate::error::ArgumentError> {
		encode::decode(text)
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Token({})", self.encode())
	}
}
impl Display for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.encode())
	}
}

/// One consumed token plus the batch material needed to seal a payload for it.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// The token to use as the channel name (after encoding).
	pub token: Token,
	/// Cipher negotiated for the batch.
	pub cipher: CipherKind,
	/// Batch key, present iff the cipher enables encryption.
	pub key: Option<BatchKey>,
	/// Position of the token within its batch; feeds nonce derivation.
	pub index: u16,
}
impl IssuedToken {
	/// Encodes the token as a URL-safe channel name.
	pub fn encoded(&self) -> String {
		self.token.encode()
	}

	/// Seals `plaintext` with the batch key and this token's index.
	pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
		let key = self.key.as_ref().ok_or(crate::error::ArgumentError::CipherNotApplicable)?;

		crate::aead::seal(self.cipher, plaintext, key.expose(), u64::from(self.index))
	}
}
