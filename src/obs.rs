//! Optional observability helpers for token manager operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `mtd_tokenmgr.op` with the `op` (operation)
//!   and `stage` (call site) fields, plus debug events for batch refills and warn events for
//!   failed operations.
//! - Enable `metrics` to increment the `mtd_tokenmgr_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and `mtd_tokenmgr_refill_total` for
//!   every installed batch, labeled by refill `reason` + `cipher`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the token manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Issuance exchange with the token issuer.
	Fetch,
	/// Token hand-out (including any refill it triggers).
	GetToken,
	/// Payload sealing.
	Seal,
	/// Token hand-out, sealing, and delivery to the publish primitive.
	Publish,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Fetch => "fetch",
			OpKind::GetToken => "get_token",
			OpKind::Seal => "seal",
			OpKind::Publish => "publish",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a manager operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}

	/// Maps a result to its outcome label.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => OpOutcome::Success,
			Err(_) => OpOutcome::Failure,
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
