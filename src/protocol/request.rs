// self
use crate::{
	_prelude::*,
	aead::CipherKind,
	error::ArgumentError,
	token::{ChannelName, Direction, MAX_CHANNEL_LEN, RANDOM_BYTES_LEN, TOKENS_PER_BATCH_UNIT},
	transport::ByteStream,
};

/// Largest batch count that fits the flag byte.
pub const MAX_BATCH_COUNT: u8 = 0x1F;

const PUBLISH_FLAG: u8 = 0x80;
const ENCRYPTION_FLAG: u8 = 0x40;
const BATCH_COUNT_MASK: u8 = 0x1F;

/// Parameters of one issuance exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IssuanceRequest {
	/// Number of 16-token units to issue (`1..=31`).
	pub batch_count: u8,
	/// Whether the tokens authorize publishing or subscribing.
	pub direction: Direction,
	/// Payload cipher requested for the batch.
	pub cipher: CipherKind,
}
impl IssuanceRequest {
	/// Creates a plaintext request.
	pub const fn new(direction: Direction, batch_count: u8) -> Self {
		Self { batch_count, direction, cipher: CipherKind::None }
	}

	/// Creates a plaintext publish request.
	pub const fn publish(batch_count: u8) -> Self {
		Self::new(Direction::Publish, batch_count)
	}

	/// Creates a plaintext subscribe request.
	pub const fn subscribe(batch_count: u8) -> Self {
		Self::new(Direction::Subscribe, batch_count)
	}

	/// Requests payload encryption with `cipher`.
	pub const fn with_cipher(mut self, cipher: CipherKind) -> Self {
		self.cipher = cipher;

		self
	}

	/// Tokens in the requested batch.
	pub fn token_count(&self) -> usize {
		usize::from(self.batch_count) * TOKENS_PER_BATCH_UNIT
	}

	/// Random pool bytes in the requested batch.
	pub fn pool_len(&self) -> usize {
		self.token_count() * RANDOM_BYTES_LEN
	}

	/// Checks the batch count range.
	pub fn validate(&self) -> Result<(), ArgumentError> {
		validate_batch_count(self.batch_count)
	}

	/// Frames the request for `channel`.
	pub fn encode(&self, channel: &ChannelName) -> Result<Vec<u8>, ArgumentError> {
		self.validate()?;

		let encrypted = self.cipher.is_encryption_enabled();
		let mut flag = self.batch_count;

		if self.direction.is_publish() {
			flag |= PUBLISH_FLAG;
		}
		if encrypted {
			flag |= ENCRYPTION_FLAG;
		}

		let mut frame = Vec::with_capacity(4 + channel.len());

		frame.push(flag);

		if encrypted {
			frame.push(self.cipher.code());
		}

		frame.extend_from_slice(&channel.wire_len().to_be_bytes());
		frame.extend_from_slice(channel.as_bytes());

		Ok(frame)
	}

	/// Reads one request frame from `stream`, as the issuer does.
	///
	/// Bit 5 of the flag byte is reserved and ignored.
	pub fn decode<S>(stream: &mut S) -> Result<(ChannelName, Self)>
	where
		S: ?Sized + ByteStream,
	{
		let mut byte = [0_u8; 1];

		stream.read_exact(&mut byte)?;

		let flag = byte[0];
		let batch_count = flag & BATCH_COUNT_MASK;

		validate_batch_count(batch_count)?;

		let direction =
			if flag & PUBLISH_FLAG != 0 { Direction::Publish } else { Direction::Subscribe };
		let cipher = if flag & ENCRYPTION_FLAG != 0 {
			stream.read_exact(&mut byte)?;

			match CipherKind::from_code(byte[0])? {
				CipherKind::None => return Err(ArgumentError::UnknownCipher { code: 0 }.into()),
				cipher => cipher,
			}
		} else {
			CipherKind::None
		};
		let mut len = [0_u8; 2];

		stream.read_exact(&mut len)?;

		let len = usize::from(u16::from_be_bytes(len));

		if len > MAX_CHANNEL_LEN {
			return Err(ArgumentError::ChannelTooLong { len, max: MAX_CHANNEL_LEN }.into());
		}

		let mut channel = vec![0; len];

		stream.read_exact(&mut channel)?;

		let channel = ChannelName::from_wire(channel)?;

		Ok((channel, Self { batch_count, direction, cipher }))
	}
}

pub(crate) fn validate_batch_count(count: u8) -> Result<(), ArgumentError> {
	if (1..=MAX_BATCH_COUNT).contains(&count) {
		Ok(())
	} else {
		Err(ArgumentError::BatchCountOutOfRange { count })
	}
}
