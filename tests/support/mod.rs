//! Scripted in-process transport shared by the gateway integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::HashSet,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
// self
use marketplace_gateway::{
	auth::{AccessToken, Credential},
	config::GatewayConfig,
	error::ApiFailure,
	gateway::Gateway,
	http::{Transport, TransportFuture},
	notify::FnNotifier,
	request::{ApiResponse, RequestDescriptor},
	store::{CredentialStore, MemoryCredentialStore},
};

pub const REFRESH_PATH: &str = "/auth/refresh";

/// What the refresh endpoint does when called.
#[derive(Clone, Debug)]
pub enum RefreshScript {
	/// Rotates the accepted token and returns it.
	Issue(&'static str),
	/// Fails with the given HTTP status.
	Status(u16),
	/// Fails before any response (connection reset).
	Network,
}

/// One request observed by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
	pub path: String,
	pub token: Option<String>,
}

/// Backend stand-in that accepts exactly one token at a time.
pub struct ScriptedTransport {
	accepted: Mutex<Option<String>>,
	refresh: RefreshScript,
	refresh_delay: Duration,
	forbidden: HashSet<String>,
	always_unauthorized: HashSet<String>,
	calls: Mutex<Vec<RecordedCall>>,
	refreshes_running: AtomicUsize,
	max_refreshes_running: AtomicUsize,
}
impl ScriptedTransport {
	pub fn new(accepted: Option<&str>, refresh: RefreshScript) -> Self {
		Self {
			accepted: Mutex::new(accepted.map(str::to_owned)),
			refresh,
			refresh_delay: Duration::from_millis(50),
			forbidden: HashSet::new(),
			always_unauthorized: HashSet::new(),
			calls: Mutex::new(Vec::new()),
			refreshes_running: AtomicUsize::new(0),
			max_refreshes_running: AtomicUsize::new(0),
		}
	}

	pub fn refresh_delay(mut self, delay: Duration) -> Self {
		self.refresh_delay = delay;

		self
	}

	/// Highest number of refresh calls ever in progress at the same time.
	pub fn max_overlapping_refreshes(&self) -> usize {
		self.max_refreshes_running.load(Ordering::SeqCst)
	}

	pub fn forbid(mut self, path: &str) -> Self {
		self.forbidden.insert(path.to_owned());

		self
	}

	pub fn always_unauthorized(mut self, path: &str) -> Self {
		self.always_unauthorized.insert(path.to_owned());

		self
	}

	/// Stops accepting the current token, as if the backend expired it.
	pub fn revoke(&self) {
		self.accepted.lock().take();
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.lock().clone()
	}

	pub fn refresh_calls(&self) -> usize {
		self.calls.lock().iter().filter(|call| call.path == REFRESH_PATH).count()
	}

	pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
		self.calls.lock().iter().filter(|call| call.path == path).cloned().collect()
	}

	fn record(&self, request: &RequestDescriptor, credential: Option<&AccessToken>) {
		self.calls.lock().push(RecordedCall {
			path: request.path.clone(),
			token: credential.map(|token| token.expose().to_owned()),
		});
	}

	async fn respond_refresh(&self) -> Result<ApiResponse, ApiFailure> {
		let _running = RunningRefresh::enter(self);

		tokio::time::sleep(self.refresh_delay).await;

		match &self.refresh {
			RefreshScript::Issue(token) => {
				*self.accepted.lock() = Some((*token).to_owned());

				let body = serde_json::json!({
					"accessToken": token,
					"user": { "id": 17, "name": "Vendor One", "role": "vendor" },
				});

				Ok(ApiResponse::new(200, body.to_string().into_bytes()))
			},
			RefreshScript::Status(status) =>
				Err(ApiFailure::from_status(*status, br#"{"message":"refresh rejected"}"#)),
			RefreshScript::Network => Err(ApiFailure::transport(std::io::Error::new(
				std::io::ErrorKind::ConnectionReset,
				"connection reset by peer",
			))),
		}
	}

	fn respond(
		&self,
		request: &RequestDescriptor,
		credential: Option<&AccessToken>,
	) -> Result<ApiResponse, ApiFailure> {
		if self.forbidden.contains(&request.path) {
			return Err(ApiFailure::from_status(403, br#"{"message":"admin role required"}"#));
		}
		if self.always_unauthorized.contains(&request.path) {
			return Err(ApiFailure::from_status(401, b""));
		}

		let accepted = self.accepted.lock().clone();

		match (credential, accepted) {
			(Some(token), Some(accepted)) if token.expose() == accepted => {
				let body = serde_json::json!({ "path": request.path, "token": accepted });

				Ok(ApiResponse::new(200, body.to_string().into_bytes()))
			},
			_ => Err(ApiFailure::from_status(401, br#"{"message":"jwt expired"}"#)),
		}
	}
}
impl Transport for ScriptedTransport {
	fn send<'a>(
		&'a self,
		request: &'a RequestDescriptor,
		credential: Option<&'a AccessToken>,
	) -> TransportFuture<'a> {
		Box::pin(async move {
			self.record(request, credential);

			if request.path == REFRESH_PATH {
				self.respond_refresh().await
			} else {
				self.respond(request, credential)
			}
		})
	}
}

// Decrements on drop so a cancelled refresh stops counting as running.
struct RunningRefresh<'a>(&'a AtomicUsize);
impl<'a> RunningRefresh<'a> {
	fn enter(transport: &'a ScriptedTransport) -> Self {
		let running = transport.refreshes_running.fetch_add(1, Ordering::SeqCst) + 1;

		transport.max_refreshes_running.fetch_max(running, Ordering::SeqCst);

		Self(&transport.refreshes_running)
	}
}
impl Drop for RunningRefresh<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

/// Gateway, its store, its transport, and a counter of session-expired events.
pub struct Harness {
	pub gateway: Gateway<ScriptedTransport>,
	pub store: MemoryCredentialStore,
	pub transport: Arc<ScriptedTransport>,
	pub expired_events: Arc<AtomicUsize>,
}
impl Harness {
	pub fn new(initial: Option<&str>, transport: ScriptedTransport) -> Self {
		let store = match initial {
			Some(token) => MemoryCredentialStore::with_credential(Credential::new(token)),
			None => MemoryCredentialStore::default(),
		};
		let transport = Arc::new(transport);
		let expired_events = Arc::new(AtomicUsize::new(0));
		let counter = expired_events.clone();
		let config = GatewayConfig::from_base_url("https://api.example.com")
			.expect("Test gateway config should be valid.");
		let shared_store: Arc<dyn CredentialStore> = Arc::new(store.clone());
		let gateway =
			Gateway::<ScriptedTransport>::with_transport(config, shared_store, transport.clone())
				.with_notifier(Arc::new(FnNotifier::new(move || {
					counter.fetch_add(1, Ordering::SeqCst);
				})));

		Self { gateway, store, transport, expired_events }
	}

	pub fn expired_events(&self) -> usize {
		self.expired_events.load(Ordering::SeqCst)
	}

	pub fn current_token(&self) -> Option<String> {
		self.store.get().map(|credential| credential.access_token.expose().to_owned())
	}
}
