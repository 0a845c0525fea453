// std
use std::time::Duration as StdDuration;
// self
use crate::{gateway::RefreshOutcome, obs::OpKind};

#[cfg(feature = "metrics")] const OP_STARTED: &str = "marketplace_gateway_op_started_total";
#[cfg(feature = "metrics")] const OP_FINISHED: &str = "marketplace_gateway_op_finished_total";
#[cfg(feature = "metrics")] const OP_DURATION: &str = "marketplace_gateway_op_duration_seconds";
#[cfg(feature = "metrics")]
const REFRESH_SETTLED: &str = "marketplace_gateway_refresh_settled_total";

/// Counts an operation start.
pub fn count_started(kind: OpKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(OP_STARTED, "op" => kind.as_str()).increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

/// Counts an operation finish and records how long it took.
pub fn count_finished(kind: OpKind, ok: bool, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		let result = if ok { "ok" } else { "error" };

		metrics::counter!(OP_FINISHED, "op" => kind.as_str(), "result" => result).increment(1);
		metrics::histogram!(OP_DURATION, "op" => kind.as_str()).record(elapsed.as_secs_f64());
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, ok, elapsed);
	}
}

/// Counts a settled refresh wave by outcome.
pub fn count_refresh_settled(outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(REFRESH_SETTLED, "outcome" => outcome.as_str()).increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
