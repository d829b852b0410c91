//! Token manager: lifecycle, on-demand refill, and token hand-out.

pub mod lifecycle;
mod metrics;
pub mod publish;

pub use lifecycle::*;
pub use metrics::*;
pub use publish::*;

// self
use crate::{
	_prelude::*,
	cache::TokenCache,
	config::ManagerConfig,
	obs::{self, OpKind, OpOutcome, OpSpan},
	protocol::{self, IssuanceRequest},
	token::{ChannelName, Direction, IssuedToken},
	transport::IssuerTransport,
};
#[cfg(feature = "tcp")] use crate::transport::TcpTransport;

/// Hands out single-use channel tokens, refilling batches from the issuer on demand.
///
/// One mutex guards the lifecycle state together with the cache, and it is held from lookup
/// through refill to consume. Two threads therefore never consume or refill the same entry
/// concurrently, and an issuer exchange blocks other callers until it completes or times out.
pub struct TokenManager<T>
where
	T: ?Sized + IssuerTransport,
{
	/// Issuer endpoint, timeouts, and batch lifetime.
	pub config: ManagerConfig,
	/// Transport used for every issuance exchange.
	pub transport: Arc<T>,
	/// Shared counters for issuance and hand-out.
	pub metrics: Arc<IssuanceMetrics>,
	inner: Mutex<Inner>,
}
impl<T> TokenManager<T>
where
	T: ?Sized + IssuerTransport,
{
	/// Creates an uninitialized manager that talks to the issuer through `transport`.
	pub fn with_transport(config: ManagerConfig, transport: impl Into<Arc<T>>) -> Self {
		Self {
			config,
			transport: transport.into(),
			metrics: Default::default(),
			inner: Mutex::new(Inner {
				state: LifecycleState::Uninitialized,
				cache: None,
				platform: Box::new(NoopPlatform),
			}),
		}
	}

	/// Sets the platform hooks run on lifecycle transitions.
	pub fn with_platform(mut self, platform: impl 'static + Platform) -> Self {
		self.inner.get_mut().platform = Box::new(platform);

		self
	}

	/// Current lifecycle state.
	pub fn state(&self) -> LifecycleState {
		self.inner.lock().state
	}

	/// Brings the platform up once: `Uninitialized → Ready`.
	///
	/// Later calls are no-ops. On failure the manager stays uninitialized.
	pub fn bring_up(&self) -> Result<()> {
		let mut inner = self.inner.lock();

		if inner.state != LifecycleState::Uninitialized {
			return Ok(());
		}

		self.config.validate()?;
		inner.platform.bring_up().map_err(|e| Error::platform("bring_up", e))?;
		inner.state = LifecycleState::Ready;

		Ok(())
	}

	/// Creates an empty cache: `Ready → Operational`.
	///
	/// Fails with [`Error::NotReady`] from any other state, without side effects.
	pub fn start(&self) -> Result<()> {
		let mut inner = self.inner.lock();

		if inner.state != LifecycleState::Ready {
			return Err(Error::NotReady { state: inner.state });
		}

		inner.platform.start().map_err(|e| Error::platform("start", e))?;
		inner.cache = Some(TokenCache::new());
		inner.state = LifecycleState::Operational;

		Ok(())
	}

	/// Releases every cache entry: `Operational → Ready`.
	///
	/// No-op in other states. The cache is released even when the platform `stop` hook fails.
	pub fn stop(&self) -> Result<()> {
		let mut inner = self.inner.lock();

		if inner.state != LifecycleState::Operational {
			return Ok(());
		}

		inner.cache = None;
		inner.state = LifecycleState::Ready;
		inner.platform.stop().map_err(|e| Error::platform("stop", e))
	}

	/// Returns the next token for `channel`, refilling from the issuer when the entry is missing,
	/// exhausted, stale, or was issued for a different cipher than `request.cipher`.
	pub fn get_token(&self, channel: &str, request: IssuanceRequest) -> Result<IssuedToken> {
		self.get_token_at(channel, request, OffsetDateTime::now_utc())
	}

	/// Same as [`get_token`](Self::get_token) with an explicit clock reading.
	pub fn get_token_at(
		&self,
		channel: &str,
		request: IssuanceRequest,
		now: OffsetDateTime,
	) -> Result<IssuedToken> {
		const KIND: OpKind = OpKind::GetToken;

		let _span = OpSpan::new(KIND, "get_token").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = self.get_token_inner(channel, &request, now);

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		if let Err(e) = &result {
			obs::trace_failure(KIND, e);
		}

		result
	}

	/// Tokens left in the batch for `(channel, direction)`.
	pub fn remaining(&self, channel: &str, direction: Direction) -> Result<usize> {
		let inner = self.inner.lock();
		let cache = inner.operational_cache()?;

		ChannelName::validate(channel)?;

		Ok(cache.remaining(channel, direction))
	}

	/// Number of installed batches; zero unless operational.
	pub fn cached_batches(&self) -> usize {
		self.inner.lock().cache.as_ref().map_or(0, TokenCache::len)
	}

	fn get_token_inner(
		&self,
		channel: &str,
		request: &IssuanceRequest,
		now: OffsetDateTime,
	) -> Result<IssuedToken> {
		let mut inner = self.inner.lock();
		let cache = inner.operational_cache_mut()?;

		ChannelName::validate(channel)?;
		request.validate()?;

		let entry = cache.lookup(channel, request.direction);
		let lifetime = self.config.batch_lifetime();

		if let Some(reason) = TokenCache::refill_reason(entry, request.cipher, now, lifetime) {
			let channel = ChannelName::new(channel)?;

			self.refill(cache, &channel, request, now)?;
			obs::record_refill(reason, request.cipher);
			obs::trace_refill(&channel, request.direction, reason, request.token_count());
		}

		let token = cache.consume(channel, request.direction)?;

		self.metrics.record_token();

		Ok(token)
	}

	fn refill(
		&self,
		cache: &mut TokenCache,
		channel: &ChannelName,
		request: &IssuanceRequest,
		now: OffsetDateTime,
	) -> Result<()> {
		const KIND: OpKind = OpKind::Fetch;

		let _span = OpSpan::new(KIND, "refill").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.metrics.record_fetch_attempt();

		let result = protocol::refill(
			cache,
			self.transport.as_ref(),
			&self.config.issuer,
			channel,
			request,
			now,
		);

		match &result {
			Ok(()) => self.metrics.record_fetch_success(),
			Err(_) => self.metrics.record_fetch_failure(),
		}

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}
}
#[cfg(feature = "tcp")]
impl TokenManager<TcpTransport> {
	/// Creates an uninitialized manager using plain TCP with the timeouts from `config`.
	pub fn new(config: ManagerConfig) -> Self {
		let transport = TcpTransport::from_config(&config);

		Self::with_transport(config, transport)
	}
}
impl<T> Debug for TokenManager<T>
where
	T: ?Sized + IssuerTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("config", &self.config)
			.field("state", &self.state())
			.field("cached_batches", &self.cached_batches())
			.finish()
	}
}

struct Inner {
	state: LifecycleState,
	cache: Option<TokenCache>,
	platform: Box<dyn Platform>,
}
impl Inner {
	fn operational_cache(&self) -> Result<&TokenCache> {
		match (self.state, &self.cache) {
			(LifecycleState::Operational, Some(cache)) => Ok(cache),
			(state, _) => Err(Error::NotReady { state }),
		}
	}

	fn operational_cache_mut(&mut self) -> Result<&mut TokenCache> {
		match (self.state, &mut self.cache) {
			(LifecycleState::Operational, Some(cache)) => Ok(cache),
			(state, _) => Err(Error::NotReady { state }),
		}
	}
}
