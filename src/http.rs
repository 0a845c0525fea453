//! Transport primitives for API calls.
//!
//! [`Transport`] is the gateway's only dependency on an HTTP stack. An implementation sends
//! exactly one request, attaches the bearer credential when one is supplied, and normalizes the
//! outcome into an [`ApiResponse`] or a classified [`ApiFailure`]. It never retries; retry policy
//! belongs to the [`Gateway`](crate::gateway::Gateway).

// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::ApiFailure,
	request::{ApiResponse, RequestDescriptor},
};
#[cfg(feature = "reqwest")]
use crate::{config::GatewayConfig, error::ConfigError, request::Method};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, ApiFailure>> + 'a + Send>>;

/// Sends one request to the remote API.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by every
/// clone of a gateway, and their futures must be `Send` so calls can hop executors.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request`, attaching `credential` as a bearer token when present.
	fn send<'a>(
		&'a self,
		request: &'a RequestDescriptor,
		credential: Option<&'a AccessToken>,
	) -> TransportFuture<'a>;
}

/// Reqwest-backed [`Transport`].
///
/// The client keeps a cookie jar so the session cookie set by the login endpoint travels with
/// later refresh calls.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	base_url: Url,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport for the configured base URL and timeout.
	pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().cookie_store(true);

		if let Some(timeout) = config.request_timeout() {
			builder = builder.timeout(timeout);
		}

		Ok(Self::with_client(builder.build()?, config.base_url().clone()))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, base_url: Url) -> Self {
		Self { client, base_url }
	}

	/// Base URL descriptor paths are joined onto.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	fn endpoint(&self, request: &RequestDescriptor) -> Url {
		// Descriptor paths may carry their own `?query`; `set_path` would escape it.
		let (path, inline_query) = match request.path.split_once('?') {
			Some((path, query)) => (path, Some(query)),
			None => (request.path.as_str(), None),
		};
		let mut url = self.base_url.clone();

		url.set_path(&format!(
			"{}/{}",
			self.base_url.path().trim_end_matches('/'),
			path.trim_start_matches('/')
		));
		url.set_fragment(None);
		url.set_query(inline_query.filter(|query| !query.is_empty()));

		if !request.query.is_empty() {
			url.query_pairs_mut().extend_pairs(request.query.iter());
		}

		url
	}

	async fn execute(
		&self,
		request: &RequestDescriptor,
		credential: Option<&AccessToken>,
	) -> Result<ApiResponse, ApiFailure> {
		let mut builder =
			self.client.request(reqwest_method(request.method), self.endpoint(request));

		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(token) = credential {
			builder = builder.header(AUTHORIZATION, token.bearer());
		}
		if let Some(body) = &request.body {
			let bytes = serde_json::to_vec(body).map_err(ApiFailure::transport)?;

			builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
		}

		let response = builder.send().await.map_err(ApiFailure::transport)?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let body = response.bytes().await.map_err(ApiFailure::transport)?;

		if status.is_success() {
			Ok(ApiResponse::new(status.as_u16(), body.to_vec()))
		} else {
			Err(ApiFailure::from_status(status.as_u16(), &body).with_retry_after(retry_after))
		}
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send<'a>(
		&'a self,
		request: &'a RequestDescriptor,
		credential: Option<&'a AccessToken>,
	) -> TransportFuture<'a> {
		Box::pin(self.execute(request, credential))
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
