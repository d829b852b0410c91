//! Token issuance protocol: request framing, response parsing, and cache refill.
//!
//! One exchange is a single request frame followed by a fixed-size response whose length is fully
//! determined by the request, so the client never has to parse lengths from the issuer.
//!
//! ```text
//! request:  flag(1) [cipher(1)] channel_len(2, BE) channel(N)
//! response: [key(16|32)] timestamp(6) random(batch_count * 16 * 6)
//! ```

mod request;
mod response;

pub use request::*;
pub use response::*;

// self
use crate::{
	_prelude::*,
	cache::TokenCache,
	config::IssuerEndpoint,
	token::ChannelName,
	transport::{ByteStream, IssuerTransport},
};

/// Requests one batch from the issuer.
///
/// The request is validated and framed before the transport is touched, so malformed input never
/// opens a connection. The stream is closed when it goes out of scope.
pub fn fetch<T>(
	transport: &T,
	endpoint: &IssuerEndpoint,
	channel: &ChannelName,
	request: &IssuanceRequest,
) -> Result<IssuedBatch>
where
	T: ?Sized + IssuerTransport,
{
	let frame = request.encode(channel)?;
	let mut stream = transport.open(endpoint)?;

	stream.write_all(&frame)?;

	IssuedBatch::read_from(&mut stream, request)
}

/// Fetches a batch and installs it in `cache` at `now`.
///
/// Nothing is installed unless the whole response was received, so a failed exchange leaves the
/// previous entry usable.
pub fn refill<T>(
	cache: &mut TokenCache,
	transport: &T,
	endpoint: &IssuerEndpoint,
	channel: &ChannelName,
	request: &IssuanceRequest,
	now: OffsetDateTime,
) -> Result<()>
where
	T: ?Sized + IssuerTransport,
{
	let batch = fetch(transport, endpoint, channel, request)?;

	cache.install(channel.clone(), request.direction, batch, now)
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		aead::CipherKind,
		error::TransportError,
		token::{Direction, TOKENS_PER_BATCH_UNIT},
	};

	/// Stream that replays a canned response and records what the client wrote.
	struct Canned {
		response: Vec<u8>,
		offset: usize,
		written: Arc<Mutex<Vec<u8>>>,
	}
	impl ByteStream for Canned {
		fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
			let end = self.offset + buf.len();
			let chunk = self.response.get(self.offset..end).ok_or_else(|| {
				TransportError::Io(std::io::ErrorKind::UnexpectedEof.into())
			})?;

			buf.copy_from_slice(chunk);
			self.offset = end;

			Ok(())
		}

		fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
			self.written.lock().extend_from_slice(buf);

			Ok(())
		}
	}

	#[derive(Default)]
	struct CannedTransport {
		response: Vec<u8>,
		opens: AtomicUsize,
		written: Arc<Mutex<Vec<u8>>>,
	}
	impl IssuerTransport for CannedTransport {
		type Stream = Canned;

		fn open(&self, _: &IssuerEndpoint) -> Result<Self::Stream, TransportError> {
			self.opens.fetch_add(1, Ordering::SeqCst);

			Ok(Canned { response: self.response.clone(), offset: 0, written: self.written.clone() })
		}
	}

	fn channel() -> ChannelName {
		ChannelName::new("/sample/topic/pub").expect("Test channel should be valid.")
	}

	#[test]
	fn fetch_writes_one_frame_and_reads_fixed_response() {
		let mut response = vec![0xAB; 16];

		response.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
		response.extend((0..TOKENS_PER_BATCH_UNIT * 6).map(|i| i as u8));

		let transport = CannedTransport { response, ..Default::default() };
		let request = IssuanceRequest::publish(1).with_cipher(CipherKind::Aes128Gcm);
		let batch = fetch(&transport, &IssuerEndpoint::default(), &channel(), &request)
			.expect("Canned response should parse.");

		assert_eq!(transport.opens.load(Ordering::SeqCst), 1);
		assert_eq!(
			transport.written.lock().as_slice(),
			request.encode(&channel()).expect("Request should encode.").as_slice()
		);
		assert_eq!(batch.key.as_ref().map(|key| key.expose().to_vec()), Some(vec![0xAB; 16]));
		assert_eq!(batch.timestamp.as_bytes(), &[1, 2, 3, 4, 5, 6]);
		assert_eq!(batch.pool.len(), 96);
	}

	#[test]
	fn invalid_requests_never_open_the_transport() {
		let transport = CannedTransport::default();

		for count in [0, 32] {
			let err = fetch(
				&transport,
				&IssuerEndpoint::default(),
				&channel(),
				&IssuanceRequest::subscribe(count),
			)
			.expect_err("Out-of-range batch counts should be rejected.");

			assert!(matches!(err, Error::InvalidArgument(_)));
		}

		assert_eq!(transport.opens.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn truncated_response_leaves_cache_untouched() {
		let mut cache = TokenCache::new();
		let transport = CannedTransport { response: vec![0; 10], ..Default::default() };
		let err = refill(
			&mut cache,
			&transport,
			&IssuerEndpoint::default(),
			&channel(),
			&IssuanceRequest::publish(1),
			OffsetDateTime::UNIX_EPOCH,
		)
		.expect_err("A 10-byte response is too short.");

		assert!(matches!(err, Error::Transport(_)));
		assert!(cache.lookup(&channel(), Direction::Publish).is_none());
	}
}
