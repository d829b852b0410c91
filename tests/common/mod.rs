//! Scripted in-memory issuer and publisher shared by integration tests.

#![allow(dead_code)]

// std
use std::{
	io::{Cursor, ErrorKind},
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use mtd_tokenmgr::{
	config::{IssuerEndpoint, ManagerConfig},
	error::{PublishError, TransportError},
	manager::{ChannelPublisher, TokenManager},
	protocol::{IssuanceRequest, IssuedBatch},
	token::{BatchKey, BatchTimestamp, ChannelName, RandomPool},
	transport::{ByteStream, IoStream, IssuerTransport},
};

pub const CHANNEL: &str = "/sample/topic/pub";

/// Request observed by the scripted issuer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded {
	pub channel: ChannelName,
	pub request: IssuanceRequest,
}

#[derive(Debug, Default)]
struct Script {
	opens: usize,
	fail_next: usize,
	requests: Vec<Recorded>,
}

/// Issuer double that answers every request with a deterministic batch.
///
/// The n-th successful open (1-based, counting failed opens) produces timestamp `[n; 6]`, key
/// `[n; key_len]`, and pool byte `i` equal to `i + n` (wrapping).
#[derive(Clone, Debug, Default)]
pub struct ScriptedIssuer(Arc<Mutex<Script>>);
impl ScriptedIssuer {
	pub fn opens(&self) -> usize {
		self.0.lock().opens
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.0.lock().requests.clone()
	}

	/// Makes the next `count` opens fail with a refused connection.
	pub fn fail_next(&self, count: usize) {
		self.0.lock().fail_next = count;
	}
}
impl IssuerTransport for ScriptedIssuer {
	type Stream = Exchange;

	fn open(&self, endpoint: &IssuerEndpoint) -> Result<Self::Stream, TransportError> {
		let mut script = self.0.lock();

		script.opens += 1;

		if script.fail_next > 0 {
			script.fail_next -= 1;

			return Err(TransportError::Connect {
				endpoint: endpoint.to_string(),
				source: ErrorKind::ConnectionRefused.into(),
			});
		}

		Ok(Exchange {
			script: self.0.clone(),
			batch_no: script.opens as u8,
			request: Vec::new(),
			response: None,
			offset: 0,
		})
	}
}

/// One scripted exchange; the response is built when the client starts reading.
pub struct Exchange {
	script: Arc<Mutex<Script>>,
	batch_no: u8,
	request: Vec<u8>,
	response: Option<Vec<u8>>,
	offset: usize,
}
impl Exchange {
	fn respond(&mut self) -> Result<Vec<u8>, TransportError> {
		let mut frame = IoStream::new(Cursor::new(std::mem::take(&mut self.request)));
		let (channel, request) =
			IssuanceRequest::decode(&mut frame).map_err(TransportError::network)?;
		let batch = scripted_batch(&request, self.batch_no);
		let mut out = IoStream::new(Cursor::new(Vec::new()));

		self.script.lock().requests.push(Recorded { channel, request });
		batch.write_to(&mut out).map_err(TransportError::network)?;

		Ok(out.into_inner().into_inner())
	}
}
impl ByteStream for Exchange {
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
		if self.response.is_none() {
			self.response = Some(self.respond()?);
		}

		let response = self.response.as_deref().unwrap_or_default();
		let end = self.offset + buf.len();
		let chunk = response
			.get(self.offset..end)
			.ok_or_else(|| TransportError::Io(ErrorKind::UnexpectedEof.into()))?;

		buf.copy_from_slice(chunk);
		self.offset = end;

		Ok(())
	}

	fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
		self.request.extend_from_slice(buf);

		Ok(())
	}
}

/// Builds the batch the scripted issuer returns for its `batch_no`-th open.
pub fn scripted_batch(request: &IssuanceRequest, batch_no: u8) -> IssuedBatch {
	let key = request
		.cipher
		.is_encryption_enabled()
		.then(|| BatchKey::new(vec![batch_no; request.cipher.key_len()]));
	let pool =
		(0..request.pool_len()).map(|i| (i as u8).wrapping_add(batch_no)).collect::<Vec<_>>();

	IssuedBatch {
		batch_count: request.batch_count,
		cipher: request.cipher,
		key,
		timestamp: BatchTimestamp([batch_no; 6]),
		pool: RandomPool::new(pool),
	}
}

/// Manager wired to `issuer`, already operational.
pub fn operational(issuer: &ScriptedIssuer) -> TokenManager<ScriptedIssuer> {
	let manager = TokenManager::with_transport(ManagerConfig::default(), issuer.clone());

	manager.bring_up().expect("Scripted platform should come up.");
	manager.start().expect("Ready manager should start.");

	manager
}

/// Publisher double that records deliveries and can reject them.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
	pub delivered: Mutex<Vec<(String, Vec<u8>)>>,
	pub reject: bool,
}
impl ChannelPublisher for RecordingPublisher {
	fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PublishError> {
		if self.reject {
			return Err(PublishError::Rejected { reason: "broker offline".into() });
		}

		self.delivered.lock().push((channel.to_owned(), payload.to_vec()));

		Ok(())
	}
}
