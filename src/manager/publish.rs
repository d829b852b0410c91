//! Publishing a payload on a token-named channel.

// self
use crate::{
	_prelude::*,
	error::{ArgumentError, PublishError},
	manager::TokenManager,
	obs::{self, OpKind, OpOutcome, OpSpan},
	protocol::IssuanceRequest,
	token::{Direction, IssuedToken},
	transport::IssuerTransport,
};

/// Pub/sub publish primitive (an MQTT client, a test double).
pub trait ChannelPublisher {
	/// Delivers `payload` on `channel`.
	fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PublishError>;
}
impl<P> ChannelPublisher for &P
where
	P: ?Sized + ChannelPublisher,
{
	fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PublishError> {
		(**self).publish(channel, payload)
	}
}
impl<P> ChannelPublisher for Arc<P>
where
	P: ?Sized + ChannelPublisher,
{
	fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PublishError> {
		(**self).publish(channel, payload)
	}
}

impl<T> TokenManager<T>
where
	T: ?Sized + IssuerTransport,
{
	/// Publishes `payload` for `channel` on a fresh token.
	///
	/// The payload is sealed when the batch carries a key. Returns the encoded token the message
	/// was published on. A consumed token is not returned to the cache if delivery fails.
	pub fn publish<P>(
		&self,
		publisher: &P,
		channel: &str,
		request: IssuanceRequest,
		payload: &[u8],
	) -> Result<String>
	where
		P: ?Sized + ChannelPublisher,
	{
		const KIND: OpKind = OpKind::Publish;

		let _span = OpSpan::new(KIND, "publish").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = self.publish_inner(publisher, channel, request, payload);

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		if let Err(e) = &result {
			obs::trace_failure(KIND, e);
		}

		result
	}

	fn publish_inner<P>(
		&self,
		publisher: &P,
		channel: &str,
		request: IssuanceRequest,
		payload: &[u8],
	) -> Result<String>
	where
		P: ?Sized + ChannelPublisher,
	{
		if !request.direction.is_publish() {
			return Err(ArgumentError::DirectionMismatch {
				expected: Direction::Publish,
				actual: request.direction,
			}
			.into());
		}

		let issued = self.get_token(channel, request)?;
		let topic = issued.encoded();

		if issued.key.is_some() {
			let sealed = seal(&issued, payload)?;

			publisher.publish(&topic, &sealed)?;
		} else {
			publisher.publish(&topic, payload)?;
		}

		Ok(topic)
	}
}

fn seal(issued: &IssuedToken, payload: &[u8]) -> Result<Vec<u8>> {
	const KIND: OpKind = OpKind::Seal;

	let _span = OpSpan::new(KIND, "seal").entered();
	let result = issued.seal(payload);

	obs::record_op_outcome(KIND, OpOutcome::of(&result));

	result
}
