// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for issuance exchanges and token hand-outs.
#[derive(Debug, Default)]
pub struct IssuanceMetrics {
	fetch_attempts: AtomicU64,
	fetch_success: AtomicU64,
	fetch_failure: AtomicU64,
	tokens_consumed: AtomicU64,
}
impl IssuanceMetrics {
	/// Returns the total number of issuance exchanges attempted.
	pub fn fetch_attempts(&self) -> u64 {
		self.fetch_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of exchanges that installed a batch.
	pub fn fetch_successes(&self) -> u64 {
		self.fetch_success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed exchanges.
	pub fn fetch_failures(&self) -> u64 {
		self.fetch_failure.load(Ordering::Relaxed)
	}

	/// Returns the number of tokens handed out.
	pub fn tokens_consumed(&self) -> u64 {
		self.tokens_consumed.load(Ordering::Relaxed)
	}

	pub(crate) fn record_fetch_attempt(&self) {
		self.fetch_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_fetch_success(&self) {
		self.fetch_success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_fetch_failure(&self) {
		self.fetch_failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_token(&self) {
		self.tokens_consumed.fetch_add(1, Ordering::Relaxed);
	}
}
