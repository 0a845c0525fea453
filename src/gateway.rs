//! The gateway: the only network entry point feature modules use.

pub mod refresh;
pub mod session;

pub use refresh::*;
pub use session::*;

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use crate::{
	_prelude::*,
	auth::Credential,
	config::GatewayConfig,
	error::FailureKind,
	http::Transport,
	notify::{NoopNotifier, SessionNotifier},
	obs::{OpKind, OpScope},
	request::{ApiResponse, Method, RequestDescriptor},
	store::CredentialStore,
};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Attaches the current credential to every call and recovers from expired credentials.
///
/// The gateway owns the transport, the injected credential store, and a shared
/// [`RefreshCoordinator`]. Clones share all three, so every clone participates in the same
/// refresh waves.
pub struct Gateway<T>
where
	T: ?Sized + Transport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Credential slot read by every call.
	pub store: Arc<dyn CredentialStore>,
	/// Endpoint configuration.
	pub config: GatewayConfig,
	coordinator: Arc<RefreshCoordinator<T>>,
}
impl<T> Gateway<T>
where
	T: ?Sized + Transport,
{
	/// Creates a gateway around the caller-provided transport.
	///
	/// Session expiry is not reported anywhere until a notifier is attached with
	/// [`Gateway::with_notifier`]. Each gateway built here owns its own refresh slot, so share
	/// one gateway by cloning it rather than building several over the same store.
	pub fn with_transport(
		config: GatewayConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let transport = transport.into();
		let coordinator = Arc::new(RefreshCoordinator::new(
			transport.clone(),
			store.clone(),
			Arc::new(NoopNotifier),
			config.refresh_path(),
		));

		Self { transport, store, config, coordinator }
	}

	/// Routes the one-time session-expired event of each rejected refresh wave to `notifier`.
	///
	/// The refresh slot is kept, so clones taken before this call still share waves with this
	/// gateway and report to the new notifier as well.
	pub fn with_notifier(self, notifier: Arc<dyn SessionNotifier>) -> Self {
		self.coordinator.set_notifier(notifier);

		self
	}

	/// Counters describing refresh waves handled by this gateway and its clones.
	pub fn refresh_stats(&self) -> RefreshStats {
		self.coordinator.stats()
	}

	/// Returns a snapshot of the current credential.
	pub fn credential(&self) -> Option<Credential> {
		self.store.get()
	}

	/// Returns `true` when a credential is present.
	pub fn is_authenticated(&self) -> bool {
		self.store.get().is_some()
	}

	/// Sends `request` with the current credential, refreshing and replaying it once on a 401.
	///
	/// - 2xx responses are returned as-is.
	/// - 403 and every other failure are returned unchanged; no refresh is attempted.
	/// - A 401 for a call made without a credential is returned unchanged.
	/// - A 401 for a call made with a credential joins (or starts) the refresh wave. After a
	///   successful refresh the request is replayed exactly once with the new credential and
	///   that result is returned, whatever it is. A rejected refresh yields
	///   [`Error::SessionExpired`]; a transient refresh failure yields the original 401.
	pub async fn call(&self, request: RequestDescriptor) -> Result<ApiResponse> {
		let scope = OpScope::begin(OpKind::Call, &request.path);
		let result = scope.run(self.dispatch(&request)).await;

		scope.finish(&result);

		result
	}

	/// Issues `GET path` and decodes the JSON response.
	pub async fn get_json<R>(&self, path: impl Into<String>) -> Result<R>
	where
		R: for<'de> Deserialize<'de>,
	{
		let response = self.call(RequestDescriptor::get(path)).await?;

		Ok(response.json()?)
	}

	/// Sends `body` as JSON with `method` and decodes the JSON response.
	pub async fn send_json<B, R>(
		&self,
		method: Method,
		path: impl Into<String>,
		body: &B,
	) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: for<'de> Deserialize<'de>,
	{
		let request = RequestDescriptor::new(method, path).with_json(body)?;
		let response = self.call(request).await?;

		Ok(response.json()?)
	}

	async fn dispatch(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
		let credential = self.store.get();
		let failure =
			match self.transport.send(request, credential.as_ref().map(|c| &c.access_token)).await {
				Ok(response) => return Ok(response),
				Err(failure) => failure,
			};
		let stale = match credential {
			Some(credential) if failure.kind == FailureKind::Unauthenticated => credential,
			_ => return Err(failure.into()),
		};

		match self.coordinator.refresh(&stale.access_token).await {
			RefreshOutcome::Refreshed => {
				let fresh = self.store.get();
				let response = self
					.transport
					.send(request, fresh.as_ref().map(|c| &c.access_token))
					.await?;

				Ok(response)
			},
			RefreshOutcome::Rejected => Err(Error::SessionExpired),
			RefreshOutcome::Failed => Err(failure.into()),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a gateway that provisions its own reqwest transport from `config`.
	pub fn new(config: GatewayConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config)?;

		Ok(Self::with_transport(config, store, transport))
	}
}
impl<T> Clone for Gateway<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("config", &self.config)
			.field("authenticated", &self.is_authenticated())
			.field("coordinator", &self.coordinator)
			.finish()
	}
}
