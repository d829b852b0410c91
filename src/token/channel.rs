//! Validated channel names and access directions.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::{_prelude::*, error::ArgumentError};

/// Longest channel name (in UTF-8 bytes) accepted by the issuance protocol.
pub const MAX_CHANNEL_LEN: usize = 0x7F;

/// Whether a channel is used for publishing or subscribing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	/// Tokens authorize publishing on the channel.
	Publish,
	/// Tokens authorize subscribing to the channel.
	Subscribe,
}
impl Direction {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Direction::Publish => "publish",
			Direction::Subscribe => "subscribe",
		}
	}

	/// Returns `true` for [`Direction::Publish`].
	pub const fn is_publish(self) -> bool {
		matches!(self, Direction::Publish)
	}
}
impl Display for Direction {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Pub/sub channel name that fits the issuance wire format.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);
impl ChannelName {
	/// Creates a channel name after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ArgumentError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Checks `value` against the same rules as [`ChannelName::new`] without allocating.
	pub fn validate(value: &str) -> Result<(), ArgumentError> {
		validate_view(value)
	}

	/// Parses a channel name received as raw wire bytes.
	pub fn from_wire(bytes: Vec<u8>) -> Result<Self, ArgumentError> {
		let value = String::from_utf8(bytes).map_err(|_| ArgumentError::ChannelNotUtf8)?;

		Self::try_from(value)
	}

	/// Returns the channel as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns the wire length of the channel name.
	pub fn wire_len(&self) -> u16 {
		// Bounded by MAX_CHANNEL_LEN at construction.
		self.0.len() as u16
	}
}
impl Deref for ChannelName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ChannelName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ChannelName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<ChannelName> for String {
	fn from(value: ChannelName) -> Self {
		value.0
	}
}
impl TryFrom<String> for ChannelName {
	type Error = ArgumentError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for ChannelName {
	type Err = ArgumentError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for ChannelName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Channel({})", self.0)
	}
}
impl Display for ChannelName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), ArgumentError> {
	if view.is_empty() {
		return Err(ArgumentError::EmptyChannel);
	}
	if view.len() > MAX_CHANNEL_LEN {
		return Err(ArgumentError::ChannelTooLong { len: view.len(), max: MAX_CHANNEL_LEN });
	}

	Ok(())
}
