//! URL-safe text encoding for tokens used as opaque channel names.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{
	_prelude::*,
	error::ArgumentError,
	token::{ENCODED_TOKEN_LEN, TOKEN_LEN, Token},
};

/// Encodes exactly [`TOKEN_LEN`] bytes into a [`ENCODED_TOKEN_LEN`]-character string.
///
/// The output is standard base64 with `+` and `/` replaced by `-` and `_`. Twelve bytes are a
/// multiple of three, so no padding is ever produced.
pub fn encode(bytes: &[u8]) -> Result<String, ArgumentError> {
	if bytes.len() != TOKEN_LEN {
		return Err(ArgumentError::TokenLength { expected: TOKEN_LEN, actual: bytes.len() });
	}

	Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Infallible form of [`encode`] for fixed-size token arrays.
pub fn encode_token(bytes: &[u8; TOKEN_LEN]) -> String {
	URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes a [`ENCODED_TOKEN_LEN`]-character string back into a [`Token`].
pub fn decode(text: &str) -> Result<Token, ArgumentError> {
	if text.len() != ENCODED_TOKEN_LEN {
		return Err(ArgumentError::TokenEncoding);
	}

	let bytes = URL_SAFE_NO_PAD.decode(text).map_err(|_| ArgumentError::TokenEncoding)?;
	let raw: [u8; TOKEN_LEN] = bytes.as_slice().try_into().map_err(|_| {
		ArgumentError::TokenLength { expected: TOKEN_LEN, actual: bytes.len() }
	})?;

	Ok(Token::from_bytes(raw))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn is_url_safe(text: &str) -> bool {
		text.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
	}

	#[test]
	fn encoding_is_fixed_width_and_url_safe() {
		// 0xFB 0xFF 0xBF maps to "-_-_" in the URL-safe alphabet ("+/+/" in the standard one).
		let bytes = [0xFB, 0xFF, 0xBF, 0xFB, 0xFF, 0xBF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];
		let text = encode(&bytes).expect("Twelve bytes should encode.");

		assert_eq!(text, "-_-_-_-_AAAA____");
		assert_eq!(text.len(), ENCODED_TOKEN_LEN);
		assert!(is_url_safe(&text));
	}

	#[test]
	fn every_byte_value_stays_in_alphabet() {
		for value in 0_u8..=255 {
			let text = encode(&[value; TOKEN_LEN]).expect("Uniform tokens should encode.");

			assert_eq!(text.len(), ENCODED_TOKEN_LEN);
			assert!(is_url_safe(&text), "{text} contains characters outside the alphabet");
		}
	}

	#[test]
	fn wrong_lengths_are_rejected() {
		assert_eq!(encode(&[0; 11]), Err(ArgumentError::TokenLength { expected: 12, actual: 11 }));
		assert_eq!(encode(&[]), Err(ArgumentError::TokenLength { expected: 12, actual: 0 }));
		assert_eq!(decode("short"), Err(ArgumentError::TokenEncoding));
		assert_eq!(decode("++++++++++++++++"), Err(ArgumentError::TokenEncoding));
	}

	#[test]
	fn decode_inverts_encode() {
		let token = Token::from_bytes(*b"\x00\x01\x02\x03\x04\x05random");
		let text = token.encode();

		assert_eq!(decode(&text), Ok(token));
	}
}
