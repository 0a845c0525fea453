// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ApiFailure, gateway::RefreshOutcome, obs::OpKind};

/// Future returned by [`OpScope::run`](crate::obs::OpScope::run).
#[cfg(feature = "tracing")]
pub type Traced<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`OpScope::run`](crate::obs::OpScope::run).
#[cfg(not(feature = "tracing"))]
pub type Traced<F> = F;

/// Span half of an [`OpScope`](crate::obs::OpScope); empty without the `tracing` feature.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	pub(crate) fn new(kind: OpKind, target: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"marketplace_gateway.op",
				op = kind.as_str(),
				endpoint = target
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, target);

			Self {}
		}
	}

	pub(crate) fn wrap<Fut>(&self, fut: Fut) -> Traced<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	pub(crate) fn closed(&self, error: Option<&dyn Display>, elapsed: StdDuration) {
		#[cfg(feature = "tracing")]
		{
			let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

			self.span.in_scope(|| match error {
				None => tracing::debug!(elapsed_ms, "op finished"),
				Some(error) => tracing::debug!(elapsed_ms, %error, "op failed"),
			});
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (error, elapsed);
		}
	}
}

/// Emits the event closing a refresh wave.
pub fn trace_refresh_settled(outcome: RefreshOutcome, error: Option<&Error>) {
	#[cfg(feature = "tracing")]
	{
		let status = match error {
			Some(Error::Api(failure)) => failure.status,
			_ => None,
		};

		match (outcome, error) {
			(RefreshOutcome::Refreshed, _) => tracing::debug!(%outcome, "credential replaced"),
			(RefreshOutcome::Rejected, _) =>
				tracing::warn!(%outcome, ?status, "refresh rejected, session cleared"),
			(RefreshOutcome::Failed, Some(error)) =>
				tracing::warn!(%outcome, ?status, %error, "refresh failed, credential kept"),
			(RefreshOutcome::Failed, None) =>
				tracing::warn!(%outcome, "refresh failed, credential kept"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (outcome, error);
	}
}

/// Emits the event for a logout call the backend did not acknowledge.
pub fn trace_logout_failure(failure: &ApiFailure) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(kind = %failure.kind, status = ?failure.status, "logout not acknowledged");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = failure;
	}
}
