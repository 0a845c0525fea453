// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::gateway::RefreshOutcome;

/// Point-in-time copy of a coordinator's refresh counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshStats {
	/// Refresh calls issued; one per wave unless a leader was cancelled mid-call.
	pub waves: u64,
	/// Waves that stored a new credential.
	pub refreshed: u64,
	/// Waves whose refresh call was refused; each one cleared the session.
	pub rejected: u64,
	/// Waves that failed transiently and kept the credential.
	pub failed: u64,
	/// Callers that attached to a wave another caller opened.
	pub joined: u64,
}

#[derive(Debug, Default)]
pub(crate) struct RefreshCounters {
	waves: AtomicU64,
	refreshed: AtomicU64,
	rejected: AtomicU64,
	failed: AtomicU64,
	joined: AtomicU64,
}
impl RefreshCounters {
	pub(crate) fn snapshot(&self) -> RefreshStats {
		RefreshStats {
			waves: self.waves.load(Ordering::Relaxed),
			refreshed: self.refreshed.load(Ordering::Relaxed),
			rejected: self.rejected.load(Ordering::Relaxed),
			failed: self.failed.load(Ordering::Relaxed),
			joined: self.joined.load(Ordering::Relaxed),
		}
	}

	pub(crate) fn wave_started(&self) {
		self.waves.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn caller_joined(&self) {
		self.joined.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn wave_settled(&self, outcome: RefreshOutcome) {
		let counter = match outcome {
			RefreshOutcome::Refreshed => &self.refreshed,
			RefreshOutcome::Rejected => &self.rejected,
			RefreshOutcome::Failed => &self.failed,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
