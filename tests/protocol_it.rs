mod common;

// crates.io
use time::OffsetDateTime;
// self
use common::{CHANNEL, ScriptedIssuer};
use mtd_tokenmgr::{
	cache::TokenCache,
	config::IssuerEndpoint,
	error::{Error, TransportError},
	protocol::{self, IssuanceRequest},
	token::{ChannelName, Direction},
};

fn channel() -> ChannelName {
	ChannelName::new(CHANNEL).expect("Test channel should be valid.")
}

#[test]
fn failed_refill_leaves_unexhausted_entry_intact() -> color_eyre::Result<()> {
	let issuer = ScriptedIssuer::default();
	let endpoint = IssuerEndpoint::default();
	let request = IssuanceRequest::publish(1);
	let now = OffsetDateTime::now_utc();
	let mut cache = TokenCache::new();

	protocol::refill(&mut cache, &issuer, &endpoint, &channel(), &request, now)?;
	cache.consume(&channel(), Direction::Publish)?;
	issuer.fail_next(1);

	let err = protocol::refill(&mut cache, &issuer, &endpoint, &channel(), &request, now)
		.expect_err("Refused connection should fail the refill.");

	assert!(matches!(err, Error::Transport(TransportError::Connect { .. })));

	let entry = cache.lookup(&channel(), Direction::Publish).expect("Entry should survive.");

	assert_eq!(entry.cursor(), 1);
	assert_eq!(entry.timestamp().as_bytes(), &[1; 6]);

	let next = cache.consume(&channel(), Direction::Publish)?;

	assert_eq!(next.index, 1);
	assert_eq!(next.token.as_bytes(), &[1, 1, 1, 1, 1, 1, 7, 8, 9, 10, 11, 12]);

	Ok(())
}

#[test]
fn successful_refill_replaces_entry_wholesale() -> color_eyre::Result<()> {
	let issuer = ScriptedIssuer::default();
	let endpoint = IssuerEndpoint::default();
	let now = OffsetDateTime::now_utc();
	let (two, one) = (IssuanceRequest::publish(2), IssuanceRequest::publish(1));
	let mut cache = TokenCache::new();

	protocol::refill(&mut cache, &issuer, &endpoint, &channel(), &two, now)?;
	cache.consume(&channel(), Direction::Publish)?;
	protocol::refill(&mut cache, &issuer, &endpoint, &channel(), &one, now)?;

	let entry = cache.lookup(&channel(), Direction::Publish).expect("Entry should exist.");

	assert_eq!(entry.cursor(), 0);
	assert_eq!(entry.token_count(), 16);
	assert_eq!(entry.timestamp().as_bytes(), &[2; 6]);
	assert_eq!(cache.len(), 1);

	Ok(())
}

#[cfg(feature = "tcp")]
mod tcp {
	// std
	use std::{net::TcpListener, thread, time::Duration};
	// crates.io
	use color_eyre::eyre::eyre;
	use time::OffsetDateTime;
	// self
	use super::CHANNEL;
	use mtd_tokenmgr::{
		aead::{self, CipherKind},
		config::ManagerConfig,
		error::TransportError,
		manager::TokenManager,
		protocol::{IssuanceRequest, IssuedBatch},
		token::{ChannelName, Direction},
		transport::IoStream,
	};

	#[test]
	fn manager_fetches_from_local_tcp_issuer() -> color_eyre::Result<()> {
		let listener = TcpListener::bind("127.0.0.1:0")?;
		let port = listener.local_addr()?.port();
		let issuer = thread::spawn(move || -> mtd_tokenmgr::error::Result<_> {
			let (stream, _) = listener.accept().map_err(TransportError::from)?;
			let mut stream = IoStream::new(stream);
			let (channel, request) = IssuanceRequest::decode(&mut stream)?;
			let batch = IssuedBatch::mint(&request, OffsetDateTime::now_utc())?;

			batch.write_to(&mut stream)?;

			Ok((channel, request, batch))
		});
		let config = ManagerConfig::builder()
			.issuer("127.0.0.1", port)
			.io_timeout(Some(Duration::from_secs(5)))
			.build()?;
		let manager = TokenManager::new(config);

		manager.bring_up()?;
		manager.start()?;

		let request = IssuanceRequest::publish(2).with_cipher(CipherKind::ChaCha20Poly1305);
		let issued = manager.get_token(CHANNEL, request)?;
		let (channel, seen, batch) =
			issuer.join().map_err(|_| eyre!("Issuer thread panicked."))??;

		assert_eq!(channel, ChannelName::new(CHANNEL)?);
		assert_eq!(seen, request);
		assert_eq!(batch.token(0), Some(issued.token));
		assert_eq!(issued.key, batch.key);
		assert_eq!(manager.remaining(CHANNEL, Direction::Publish)?, 31);

		let key = batch.key.ok_or_else(|| eyre!("Minted batch should carry a key."))?;
		let sealed = issued.seal(b"hello, world")?;

		assert_eq!(aead::open(request.cipher, &sealed, key.expose(), 0)?, b"hello, world");

		Ok(())
	}
}
