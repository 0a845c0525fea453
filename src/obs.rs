//! Observability for gateway operations.
//!
//! Every public gateway operation runs inside an [`OpScope`]. The scope is opened before the
//! first network call and closed with the operation's result.
//!
//! # Feature Flags
//!
//! - `tracing`: the scope is a `marketplace_gateway.op` span with `op` and `endpoint` fields, and
//!   closing it emits a `debug` event carrying the elapsed time (and the error, if any). Refresh
//!   waves and failed logouts emit their own events.
//! - `metrics`: `marketplace_gateway_op_started_total{op}`,
//!   `marketplace_gateway_op_finished_total{op,result}`,
//!   `marketplace_gateway_op_duration_seconds{op}` and
//!   `marketplace_gateway_refresh_settled_total{outcome}`.
//!
//! With both features off the scope only holds a start instant.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Gateway operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Wrapped application request.
	Call,
	/// Refresh call driven by the leader of a wave.
	Refresh,
	/// Login exchange.
	Login,
	/// Logout.
	Logout,
}
impl OpKind {
	/// Label used for the `op` span field and metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Call => "call",
			Self::Refresh => "refresh",
			Self::Login => "login",
			Self::Logout => "logout",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One observed run of a gateway operation.
#[derive(Debug)]
pub struct OpScope {
	kind: OpKind,
	started: Instant,
	span: OpSpan,
}
impl OpScope {
	/// Opens a scope for `kind` acting on `target` (request or endpoint path).
	pub fn begin(kind: OpKind, target: &str) -> Self {
		count_started(kind);

		Self { kind, started: Instant::now(), span: OpSpan::new(kind, target) }
	}

	/// Runs `fut` inside the scope's span.
	pub fn run<Fut>(&self, fut: Fut) -> Traced<Fut>
	where
		Fut: Future,
	{
		self.span.wrap(fut)
	}

	/// Closes the scope with the operation's result.
	pub fn finish<T, E>(self, result: &Result<T, E>)
	where
		E: Display,
	{
		let elapsed = self.started.elapsed();

		count_finished(self.kind, result.is_ok(), elapsed);
		self.span.closed(result.as_ref().err().map(|e| e as &dyn Display), elapsed);
	}

	/// Closes the scope of an operation that cannot fail.
	pub fn succeed(self) {
		self.finish(&Ok::<(), Error>(()));
	}
}
