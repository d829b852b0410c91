//! Lifecycle states and the platform hooks run on each transition.

// self
use crate::{_prelude::*, error::BoxError};

/// Token manager lifecycle.
///
/// `Uninitialized → Ready` happens once via `bring_up`; `Ready ⇄ Operational` via `start` and
/// `stop`. The token cache only exists while `Operational`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
	/// Platform services have not been brought up.
	#[default]
	Uninitialized,
	/// Platform is up; no cache exists.
	Ready,
	/// Cache exists and tokens can be requested.
	Operational,
}
impl LifecycleState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LifecycleState::Uninitialized => "uninitialized",
			LifecycleState::Ready => "ready",
			LifecycleState::Operational => "operational",
		}
	}
}
impl Display for LifecycleState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Host services the manager depends on (network stack, clock sync, secure storage).
///
/// Every hook defaults to a no-op. A `bring_up` failure is fatal to the caller; the manager stays
/// [`LifecycleState::Uninitialized`].
pub trait Platform
where
	Self: Send,
{
	/// One-time platform initialization.
	fn bring_up(&mut self) -> Result<(), BoxError> {
		Ok(())
	}

	/// Runs when the manager becomes operational.
	fn start(&mut self) -> Result<(), BoxError> {
		Ok(())
	}

	/// Runs after the manager released its cache.
	fn stop(&mut self) -> Result<(), BoxError> {
		Ok(())
	}
}

/// Platform that needs no initialization.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPlatform;
impl Platform for NoopPlatform {}
