//! Payload sealing with per-batch keys and counter-derived nonces.
//!
//! Every batch carries a fresh key and every token index is handed out once per batch, so the
//! nonce derived from `NONCE_BASE + token_index` never repeats under the same key. No associated
//! data is bound into the tag.

// crates.io
use aes_gcm::{
	Aes128Gcm, Aes256Gcm,
	aead::{Aead, KeyInit, Nonce},
};
use chacha20poly1305::ChaCha20Poly1305;
// self
use crate::{
	_prelude::*,
	error::{ArgumentError, CryptoError},
};

/// Base added to every token index before it becomes a nonce; shared with the issuer.
pub const NONCE_BASE: u64 = 123_456;
/// Nonce length used by every supported cipher.
pub const NONCE_LEN: usize = 12;
/// Authentication tag length appended by every supported cipher.
pub const TAG_LEN: usize = 16;

/// AEAD kinds negotiated with the issuer; codes follow the TLS 1.3 AEAD suites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherKind {
	/// Payloads travel in the clear.
	#[default]
	#[serde(rename = "none")]
	None,
	/// AES-128 in Galois/Counter Mode.
	#[serde(rename = "aes128-gcm")]
	Aes128Gcm,
	/// AES-256 in Galois/Counter Mode.
	#[serde(rename = "aes256-gcm")]
	Aes256Gcm,
	/// ChaCha20 stream cipher with a Poly1305 authenticator.
	#[serde(rename = "chacha20-poly1305")]
	ChaCha20Poly1305,
}
impl CipherKind {
	/// Wire code used by the issuance protocol.
	pub const fn code(self) -> u8 {
		match self {
			CipherKind::None => 0x0,
			CipherKind::Aes128Gcm => 0x1,
			CipherKind::Aes256Gcm => 0x2,
			CipherKind::ChaCha20Poly1305 => 0x3,
		}
	}

	/// Resolves a wire code.
	pub const fn from_code(code: u8) -> Result<Self, ArgumentError> {
		match code {
			0x0 => Ok(CipherKind::None),
			0x1 => Ok(CipherKind::Aes128Gcm),
			0x2 => Ok(CipherKind::Aes256Gcm),
			0x3 => Ok(CipherKind::ChaCha20Poly1305),
			_ => Err(ArgumentError::UnknownCipher { code }),
		}
	}

	/// Returns `true` for every kind except [`CipherKind::None`].
	pub const fn is_encryption_enabled(self) -> bool {
		!matches!(self, CipherKind::None)
	}

	/// Key length in bytes (zero for [`CipherKind::None`]).
	pub const fn key_len(self) -> usize {
		match self {
			CipherKind::None => 0,
			CipherKind::Aes128Gcm => 16,
			CipherKind::Aes256Gcm | CipherKind::ChaCha20Poly1305 => 32,
		}
	}

	/// Nonce length in bytes (zero for [`CipherKind::None`]).
	pub const fn nonce_len(self) -> usize {
		if self.is_encryption_enabled() { NONCE_LEN } else { 0 }
	}

	/// Tag length in bytes (zero for [`CipherKind::None`]).
	pub const fn tag_len(self) -> usize {
		if self.is_encryption_enabled() { TAG_LEN } else { 0 }
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CipherKind::None => "none",
			CipherKind::Aes128Gcm => "aes128-gcm",
			CipherKind::Aes256Gcm => "aes256-gcm",
			CipherKind::ChaCha20Poly1305 => "chacha20-poly1305",
		}
	}
}
impl Display for CipherKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Derives the nonce for `token_index`: big-endian `NONCE_BASE + token_index` in the first eight
/// bytes, zeros in the remaining four.
pub fn nonce(token_index: u64) -> [u8; NONCE_LEN] {
	let mut nonce = [0; NONCE_LEN];

	nonce[..8].copy_from_slice(&NONCE_BASE.wrapping_add(token_index).to_be_bytes());

	nonce
}

/// Seals `plaintext` and returns `ciphertext || tag`.
pub fn seal(cipher: CipherKind, plaintext: &[u8], key: &[u8], token_index: u64) -> Result<Vec<u8>> {
	let nonce = nonce(token_index);

	match cipher {
		CipherKind::None => Err(ArgumentError::CipherNotApplicable.into()),
		CipherKind::Aes128Gcm => encrypt::<Aes128Gcm>(cipher, key, &nonce, plaintext),
		CipherKind::Aes256Gcm => encrypt::<Aes256Gcm>(cipher, key, &nonce, plaintext),
		CipherKind::ChaCha20Poly1305 => encrypt::<ChaCha20Poly1305>(cipher, key, &nonce, plaintext),
	}
}

/// Seals `plaintext` into `out`, returning the number of bytes written.
///
/// `out` must hold at least `plaintext.len() + TAG_LEN` bytes. On any error `out` is left
/// unmodified.
pub fn seal_into(
	cipher: CipherKind,
	plaintext: &[u8],
	key: &[u8],
	token_index: u64,
	out: &mut [u8],
) -> Result<usize> {
	if !cipher.is_encryption_enabled() {
		return Err(ArgumentError::CipherNotApplicable.into());
	}

	let required = plaintext.len() + cipher.tag_len();

	if out.len() < required {
		return Err(Error::BufferTooSmall { required, available: out.len() });
	}

	let sealed = seal(cipher, plaintext, key, token_index)?;

	out[..sealed.len()].copy_from_slice(&sealed);

	Ok(sealed.len())
}

/// Opens `ciphertext || tag` produced by [`seal`] for the same key and token index.
pub fn open(cipher: CipherKind, sealed: &[u8], key: &[u8], token_index: u64) -> Result<Vec<u8>> {
	let nonce = nonce(token_index);

	match cipher {
		CipherKind::None => Err(ArgumentError::CipherNotApplicable.into()),
		CipherKind::Aes128Gcm => decrypt::<Aes128Gcm>(cipher, key, &nonce, sealed),
		CipherKind::Aes256Gcm => decrypt::<Aes256Gcm>(cipher, key, &nonce, sealed),
		CipherKind::ChaCha20Poly1305 => decrypt::<ChaCha20Poly1305>(cipher, key, &nonce, sealed),
	}
}

fn init<A>(cipher: CipherKind, key: &[u8]) -> Result<A, CryptoError>
where
	A: KeyInit,
{
	A::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { cipher, len: key.len() })
}

fn encrypt<A>(
	cipher: CipherKind,
	key: &[u8],
	nonce: &[u8; NONCE_LEN],
	plaintext: &[u8],
) -> Result<Vec<u8>>
where
	A: Aead + KeyInit,
{
	let aead = init::<A>(cipher, key)?;

	aead.encrypt(Nonce::<A>::from_slice(nonce), plaintext)
		.map_err(|_| CryptoError::Seal { cipher }.into())
}

fn decrypt<A>(
	cipher: CipherKind,
	key: &[u8],
	nonce: &[u8; NONCE_LEN],
	sealed: &[u8],
) -> Result<Vec<u8>>
where
	A: Aead + KeyInit,
{
	let aead = init::<A>(cipher, key)?;

	aead.decrypt(Nonce::<A>::from_slice(nonce), sealed)
		.map_err(|_| CryptoError::Open { cipher }.into())
}
