// self
use crate::{
	_prelude::*,
	cache::RefillReason,
	obs::OpKind,
	token::{ChannelName, Direction},
};

/// A span builder used by manager operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("mtd_tokenmgr.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span until the returned guard is dropped.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Emits a debug event after a fresh batch was installed.
pub fn trace_refill(
	channel: &ChannelName,
	direction: Direction,
	reason: RefillReason,
	token_count: usize,
) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			channel = channel.as_str(),
			direction = direction.as_str(),
			reason = reason.as_str(),
			token_count,
			"Installed a fresh token batch."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (channel, direction, reason, token_count);
	}
}

/// Emits a warn event for an operation that failed.
pub fn trace_failure(kind: OpKind, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = kind.as_str(), error = %error, "Token manager operation failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn op_span_noop_without_tracing() {
		let _guard = OpSpan::new(OpKind::Fetch, "test").entered();
		// Compile-time smoke test ensures the guard exists even when tracing is disabled.
	}

	#[test]
	fn events_accept_domain_values() {
		let channel = ChannelName::new("/sample/topic/pub").expect("Test channel should be valid.");

		trace_refill(&channel, Direction::Publish, RefillReason::Missing, 16);
		trace_failure(OpKind::GetToken, &Error::Exhausted);
	}
}
