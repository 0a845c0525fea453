//! Single-flight credential refresh.
//!
//! The coordinator moves between two states: idle (no operation in the slot) and refreshing
//! (exactly one operation in the slot). The first caller of a wave that sees a 401 while a
//! credential is present installs a fresh operation and drives the refresh call; every caller
//! that arrives while the operation is in the slot awaits the same [`OnceCell`] instead of
//! issuing another call.
//!
//! Settling an operation always happens in this order:
//!
//! 1. update the credential store (`set` on success, `clear` on rejection),
//! 2. remove the operation from the slot,
//! 3. fire the session notifier (rejection only, once per wave),
//! 4. resolve the shared outcome so waiters resume.
//!
//! Waiters therefore always observe the new credential when they retry. If the task driving a
//! refresh is dropped mid-call, its refresh call is dropped with it and the next waiter polling
//! the cell reruns the refresh for the same operation, so refresh calls never overlap.

mod stats;

pub use stats::RefreshStats;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, SessionPayload},
	gateway::refresh::stats::RefreshCounters,
	http::Transport,
	notify::SessionNotifier,
	obs::{self, OpKind, OpScope},
	request::RequestDescriptor,
	store::CredentialStore,
};

type RefreshOperation = Arc<OnceCell<RefreshOutcome>>;

/// How a refresh wave settled, as seen by every caller attached to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// A new credential is in the store; retry the original request once.
	Refreshed,
	/// The refresh endpoint rejected the session; the store was cleared.
	Rejected,
	/// The refresh call failed transiently; the credential was left untouched.
	Failed,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Refreshed => "refreshed",
			RefreshOutcome::Rejected => "rejected",
			RefreshOutcome::Failed => "failed",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

enum Attachment {
	Leader(RefreshOperation),
	Waiter(RefreshOperation),
	Settled(RefreshOutcome),
}

/// Runs at most one refresh call at a time and shares its outcome with every waiting caller.
pub struct RefreshCoordinator<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
	store: Arc<dyn CredentialStore>,
	notifier: RwLock<Arc<dyn SessionNotifier>>,
	request: RequestDescriptor,
	counters: RefreshCounters,
	in_flight: Mutex<Option<RefreshOperation>>,
}
impl<T> RefreshCoordinator<T>
where
	T: ?Sized + Transport,
{
	/// Creates an idle coordinator that refreshes via `POST refresh_path`.
	pub fn new(
		transport: Arc<T>,
		store: Arc<dyn CredentialStore>,
		notifier: Arc<dyn SessionNotifier>,
		refresh_path: impl Into<String>,
	) -> Self {
		Self {
			transport,
			store,
			notifier: RwLock::new(notifier),
			request: RequestDescriptor::post(refresh_path),
			counters: Default::default(),
			in_flight: Mutex::new(None),
		}
	}

	/// Snapshot of the refresh counters.
	pub fn stats(&self) -> RefreshStats {
		self.counters.snapshot()
	}

	/// Replaces the receiver of session-expired events for all future waves.
	pub fn set_notifier(&self, notifier: Arc<dyn SessionNotifier>) {
		*self.notifier.write() = notifier;
	}

	/// Returns `true` while a refresh call is outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.in_flight.lock().is_some()
	}

	/// Resolves a 401 observed by a caller that sent `stale`.
	///
	/// Joins the in-flight wave when there is one. Otherwise a caller whose token has already
	/// been replaced is told [`RefreshOutcome::Refreshed`], a caller whose session has already
	/// been cleared is told [`RefreshOutcome::Rejected`] (without a second notification), and
	/// only a caller still holding the stored token starts a new wave.
	pub async fn refresh(&self, stale: &AccessToken) -> RefreshOutcome {
		let operation = match self.attach(stale) {
			Attachment::Settled(outcome) => return outcome,
			Attachment::Leader(operation) => operation,
			Attachment::Waiter(operation) => {
				self.counters.caller_joined();

				operation
			},
		};

		*operation.get_or_init(|| self.settle(&operation)).await
	}

	fn attach(&self, stale: &AccessToken) -> Attachment {
		let mut slot = self.in_flight.lock();

		if let Some(operation) = slot.as_ref() {
			return Attachment::Waiter(operation.clone());
		}

		match self.store.get() {
			None => Attachment::Settled(RefreshOutcome::Rejected),
			Some(current) if !current.holds(stale) =>
				Attachment::Settled(RefreshOutcome::Refreshed),
			Some(_) => {
				let operation = Arc::new(OnceCell::new());

				*slot = Some(operation.clone());

				Attachment::Leader(operation)
			},
		}
	}

	async fn settle(&self, operation: &RefreshOperation) -> RefreshOutcome {
		let scope = OpScope::begin(OpKind::Refresh, &self.request.path);

		self.counters.wave_started();

		let (outcome, error) = scope.run(self.exchange()).await;

		self.release(operation);
		self.counters.wave_settled(outcome);

		if outcome == RefreshOutcome::Rejected {
			let notifier = self.notifier.read().clone();

			notifier.session_expired();
		}

		obs::count_refresh_settled(outcome);
		obs::trace_refresh_settled(outcome, error.as_ref());

		match error {
			Some(error) => scope.finish(&Err::<(), _>(error)),
			None => scope.succeed(),
		}

		outcome
	}

	async fn exchange(&self) -> (RefreshOutcome, Option<Error>) {
		match self.transport.send(&self.request, None).await {
			Ok(response) => match response
				.json::<SessionPayload>()
				.and_then(|payload| payload.into_credential(OffsetDateTime::now_utc()))
			{
				Ok(credential) => {
					self.store.set(credential);

					(RefreshOutcome::Refreshed, None)
				},
				// A 2xx without a usable token says nothing about the session; keep it.
				Err(e) => (RefreshOutcome::Failed, Some(e.into())),
			},
			Err(failure) if failure.kind.is_auth_rejection() => {
				self.store.clear();

				(RefreshOutcome::Rejected, Some(failure.into()))
			},
			Err(failure) => (RefreshOutcome::Failed, Some(failure.into())),
		}
	}

	fn release(&self, operation: &RefreshOperation) {
		let mut slot = self.in_flight.lock();

		if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, operation)) {
			slot.take();
		}
	}
}
impl<T> Debug for RefreshCoordinator<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("refresh_path", &self.request.path)
			.field("refreshing", &self.is_refreshing())
			.field("stats", &self.stats())
			.finish()
	}
}
