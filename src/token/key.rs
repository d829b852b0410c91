//! Secret batch material (AEAD keys, random pools) that redacts itself and zeroizes on drop.

// crates.io
use zeroize::Zeroizing;
// self
use crate::_prelude::*;

/// Per-batch AEAD key issued alongside a token batch.
#[derive(Clone, PartialEq, Eq)]
pub struct BatchKey(Zeroizing<Vec<u8>>);
impl BatchKey {
	/// Wraps raw key bytes.
	pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
		Self(Zeroizing::new(bytes.into()))
	}

	/// Returns the key bytes. Callers must avoid logging them.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	/// Key length in bytes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the key holds no bytes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<Zeroizing<Vec<u8>>> for BatchKey {
	fn from(value: Zeroizing<Vec<u8>>) -> Self {
		Self(value)
	}
}
impl Debug for BatchKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BatchKey").field(&"<redacted>").finish()
	}
}
impl Display for BatchKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Issuer-supplied random bytes, six per token, consumed front to back.
#[derive(Clone, PartialEq, Eq)]
pub struct RandomPool(Zeroizing<Vec<u8>>);
impl RandomPool {
	/// Wraps raw pool bytes.
	pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
		Self(Zeroizing::new(bytes.into()))
	}

	/// Pool length in bytes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the pool holds no bytes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the raw pool bytes.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	/// Returns the random slice for the token at `index`, if present.
	pub fn slice(&self, index: usize) -> Option<[u8; super::RANDOM_BYTES_LEN]> {
		let start = index.checked_mul(super::RANDOM_BYTES_LEN)?;
		let end = start.checked_add(super::RANDOM_BYTES_LEN)?;

		self.0.get(start..end)?.try_into().ok()
	}
}
impl From<Zeroizing<Vec<u8>>> for RandomPool {
	fn from(value: Zeroizing<Vec<u8>>) -> Self {
		Self(value)
	}
}
impl Debug for RandomPool {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RandomPool").field("len", &self.0.len()).finish_non_exhaustive()
	}
}
