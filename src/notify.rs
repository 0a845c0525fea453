//! Session-expiry notification hooks.
//!
//! The gateway never navigates anywhere itself. When a refresh wave ends with the session
//! rejected, it fires [`SessionNotifier::session_expired`] exactly once for the whole wave and
//! leaves the sign-in redirect (or equivalent) to the notifier.

// self
use crate::_prelude::*;

/// Receiver of the one-time session-expired event.
pub trait SessionNotifier
where
	Self: Send + Sync,
{
	/// Called once per refresh wave whose refresh call was rejected.
	fn session_expired(&self);
}

/// Notifier that ignores the event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;
impl SessionNotifier for NoopNotifier {
	fn session_expired(&self) {}
}

/// Adapts a closure into a [`SessionNotifier`].
#[derive(Clone)]
pub struct FnNotifier<F>(F);
impl<F> FnNotifier<F>
where
	F: Fn() + Send + Sync,
{
	/// Wraps the closure.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F> SessionNotifier for FnNotifier<F>
where
	F: Fn() + Send + Sync,
{
	fn session_expired(&self) {
		(self.0)()
	}
}
impl<F> Debug for FnNotifier<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnNotifier(..)")
	}
}
