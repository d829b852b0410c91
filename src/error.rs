//! Crate-level error types shared by the cache, issuance protocol, sealer, and manager.

// self
use crate::{_prelude::*, aead::CipherKind, manager::LifecycleState, token::Direction};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used by collaborator hooks (platform bring-up, publish backends).
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Malformed caller input; never touches the network or mutates the cache.
	#[error(transparent)]
	InvalidArgument(#[from] ArgumentError),
	/// Operation attempted outside the operational lifecycle state.
	#[error("Token manager is not operational (current state: {state}).")]
	NotReady {
		/// State observed when the call was rejected.
		state: LifecycleState,
	},
	/// Byte-stream read/write or connection setup did not complete.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A depleted batch was consumed without a prior successful refill.
	#[error("Token batch is exhausted; a refill is required before consuming.")]
	Exhausted,
	/// AEAD setup or sealing was rejected by the underlying primitive.
	#[error(transparent)]
	Crypto(#[from] CryptoError),
	/// Caller-provided output buffer cannot hold the sealed message.
	#[error("Output buffer holds {available} bytes but {required} are required.")]
	BufferTooSmall {
		/// Bytes needed for ciphertext plus tag.
		required: usize,
		/// Bytes available in the caller's buffer.
		available: usize,
	},
	/// Allocation of a key or random pool failed.
	#[error("Unable to allocate {requested} bytes for token material.")]
	OutOfMemory {
		/// Size of the failed allocation.
		requested: usize,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Platform hook failed during a lifecycle transition.
	#[error("Platform {stage} hook failed.")]
	Platform {
		/// Lifecycle stage that invoked the hook.
		stage: &'static str,
		/// Underlying platform failure.
		#[source]
		source: BoxError,
	},
	/// Channel publish primitive rejected the message.
	#[error(transparent)]
	Publish(#[from] PublishError),
}
impl Error {
	/// Wraps a platform hook failure raised during `stage`.
	pub fn platform(stage: &'static str, source: BoxError) -> Self {
		Self::Platform { stage, source }
	}
}

/// Caller input that failed validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ArgumentError {
	/// Batch count outside `1..=31`.
	#[error("Batch count {count} is outside the range [1, 31].")]
	BatchCountOutOfRange {
		/// Rejected batch count.
		count: u8,
	},
	/// Channel name was empty.
	#[error("Channel name cannot be empty.")]
	EmptyChannel,
	/// Channel name exceeds the wire limit.
	#[error("Channel name is {len} bytes; at most {max} bytes are allowed.")]
	ChannelTooLong {
		/// Encoded length of the rejected channel.
		len: usize,
		/// Maximum permitted encoded length.
		max: usize,
	},
	/// Channel bytes received from the wire are not UTF-8.
	#[error("Channel name is not valid UTF-8.")]
	ChannelNotUtf8,
	/// Cipher code not recognized by the protocol.
	#[error("Cipher code {code:#04x} is not supported.")]
	UnknownCipher {
		/// Rejected wire code.
		code: u8,
	},
	/// Sealing or opening was requested without a cipher.
	#[error("Cipher `none` cannot seal or open payloads.")]
	CipherNotApplicable,
	/// Token input does not have the fixed token length.
	#[error("Token must be exactly {expected} bytes, got {actual}.")]
	TokenLength {
		/// Required length.
		expected: usize,
		/// Supplied length.
		actual: usize,
	},
	/// Encoded token text could not be decoded.
	#[error("Encoded token is malformed.")]
	TokenEncoding,
	/// Batch key presence or length does not match the cipher.
	#[error("Batch key is {actual} bytes but cipher {cipher} expects {expected}.")]
	KeyMismatch {
		/// Cipher declared for the batch.
		cipher: CipherKind,
		/// Key length required by the cipher.
		expected: usize,
		/// Key length supplied.
		actual: usize,
	},
	/// Request direction does not fit the operation.
	#[error("Operation requires a {expected} request, got {actual}.")]
	DirectionMismatch {
		/// Direction the operation needs.
		expected: Direction,
		/// Direction supplied by the caller.
		actual: Direction,
	},
	/// Random pool length does not match the declared token count.
	#[error("Random pool is {actual} bytes but {expected} are required.")]
	PoolLength {
		/// Required pool length.
		expected: usize,
		/// Supplied pool length.
		actual: usize,
	},
}

/// Transport-level failures (connect, read, write).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connection to the issuer could not be established.
	#[error("Unable to connect to issuer at {endpoint}.")]
	Connect {
		/// Issuer endpoint label.
		endpoint: String,
		/// Underlying socket failure.
		#[source]
		source: std::io::Error,
	},
	/// Underlying IO failure surfaced by the byte stream.
	#[error("I/O error occurred while talking to the issuer.")]
	Io(#[from] std::io::Error),
	/// Transport-specific failure from a custom stream implementation.
	#[error("Network error occurred while talking to the issuer.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// AEAD primitive failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CryptoError {
	/// Key length was rejected by the cipher implementation.
	#[error("Cipher {cipher} rejected a {len}-byte key.")]
	InvalidKeyLength {
		/// Cipher being initialized.
		cipher: CipherKind,
		/// Supplied key length.
		len: usize,
	},
	/// Encryption failed inside the primitive.
	#[error("Cipher {cipher} failed to seal the payload.")]
	Seal {
		/// Cipher in use.
		cipher: CipherKind,
	},
	/// Authentication tag did not verify.
	#[error("Cipher {cipher} failed to authenticate the payload.")]
	Open {
		/// Cipher in use.
		cipher: CipherKind,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Issuer host is empty or contains whitespace.
	#[error("Issuer host `{host}` is invalid.")]
	InvalidHost {
		/// Rejected host string.
		host: String,
	},
	/// Issuer port is zero.
	#[error("Issuer port must be non-zero.")]
	InvalidPort,
	/// A duration setting is zero.
	#[error("The {field} setting must be greater than zero.")]
	ZeroDuration {
		/// Offending setting name.
		field: &'static str,
	},
	/// JSON configuration could not be parsed.
	#[error("Configuration is malformed.")]
	Parse {
		/// Path-qualified parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Failures reported by a [`ChannelPublisher`](crate::manager::ChannelPublisher).
#[derive(Debug, ThisError)]
pub enum PublishError {
	/// Broker refused the message.
	#[error("Publish was rejected: {reason}.")]
	Rejected {
		/// Backend-supplied reason.
		reason: String,
	},
	/// Delivery client failed before handing the message to the broker.
	#[error("Publish delivery failed.")]
	Delivery {
		/// Backend-specific failure.
		#[source]
		source: BoxError,
	},
}
impl PublishError {
	/// Wraps a backend-specific delivery failure.
	pub fn delivery(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Delivery { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn transport_error_converts_into_crate_error_with_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
		let error: Error = TransportError::from(io).into();

		assert!(matches!(error, Error::Transport(TransportError::Io(_))));

		let source =
			StdError::source(&error).expect("Transport error should expose the IO source.");

		assert_eq!(source.to_string(), "peer reset");
	}

	#[test]
	fn argument_errors_render_limits() {
		let error: Error = ArgumentError::ChannelTooLong { len: 200, max: 127 }.into();

		assert_eq!(error.to_string(), "Channel name is 200 bytes; at most 127 bytes are allowed.");
		assert!(matches!(error, Error::InvalidArgument(_)));
	}

	#[test]
	fn not_ready_reports_state() {
		let error = Error::NotReady { state: LifecycleState::Ready };

		assert!(error.to_string().contains("ready"));
	}
}
