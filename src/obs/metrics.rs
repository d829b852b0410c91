// self
use crate::{
	aead::CipherKind,
	cache::RefillReason,
	obs::{OpKind, OpOutcome},
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mtd_tokenmgr_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts an installed batch by what forced the refill and which cipher it was issued for.
pub fn record_refill(reason: RefillReason, cipher: CipherKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mtd_tokenmgr_refill_total",
			"reason" => reason.as_str(),
			"cipher" => cipher.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (reason, cipher);
	}
}
