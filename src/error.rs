//! Gateway-level error types shared by the transport, coordinator, and session helpers.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Classified backend or network failure, surfaced untouched.
	#[error(transparent)]
	Api(#[from] ApiFailure),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Request body could not be encoded as JSON.
	#[error("Request body could not be encoded as JSON.")]
	Encode(#[source] serde_json::Error),

	/// The refresh endpoint rejected the session; the credential has been cleared.
	#[error("Session expired; the user must sign in again.")]
	SessionExpired,
}
impl Error {
	/// Returns the failure classification when the error came from the backend or network.
	pub fn failure_kind(&self) -> Option<FailureKind> {
		match self {
			Self::Api(failure) => Some(failure.kind),
			_ => None,
		}
	}

	/// Returns `true` when the session was invalidated by a rejected refresh.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired)
	}
}

/// Classification applied to every transport failure.
///
/// Only [`FailureKind::Unauthenticated`] participates in refresh logic. A 403 means the credential
/// is valid but lacks rights, so it must never be treated as an expired session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
	/// HTTP 401: credential missing, invalid, or expired.
	Unauthenticated,
	/// HTTP 403: credential valid but lacking rights.
	Forbidden,
	/// Everything else (network failure, validation error, 5xx).
	Other,
}
impl FailureKind {
	/// Classifies an HTTP status code.
	pub const fn from_status(status: u16) -> Self {
		match status {
			401 => Self::Unauthenticated,
			403 => Self::Forbidden,
			_ => Self::Other,
		}
	}

	/// Returns `true` for the two classes that mean the server refused the session itself.
	pub const fn is_auth_rejection(self) -> bool {
		matches!(self, Self::Unauthenticated | Self::Forbidden)
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Unauthenticated => "unauthenticated",
			Self::Forbidden => "forbidden",
			Self::Other => "other",
		}
	}
}
impl Display for FailureKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Body returned alongside a failed response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailurePayload {
	/// Body parsed as JSON.
	Json(serde_json::Value),
	/// Non-JSON body, truncated to a short preview.
	Text(String),
}
impl FailurePayload {
	const PREVIEW_LIMIT: usize = 256;

	fn from_body(body: &[u8]) -> Option<Self> {
		if body.is_empty() {
			return None;
		}
		if let Ok(value) = serde_json::from_slice(body) {
			return Some(Self::Json(value));
		}

		let text = String::from_utf8_lossy(body);
		let text = text.trim();

		if text.is_empty() { None } else { Some(Self::Text(truncate_preview(text))) }
	}

	/// Returns the server-supplied message (`message` or `error` field, or the text preview).
	pub fn message(&self) -> Option<&str> {
		match self {
			Self::Json(value) => ["message", "error"]
				.iter()
				.find_map(|key| value.get(key).and_then(serde_json::Value::as_str)),
			Self::Text(text) => Some(text),
		}
	}
}

/// Classified failure produced by a [`Transport`](crate::http::Transport).
#[derive(Debug, ThisError)]
#[error("{}", describe_failure(.kind, .status, .payload))]
pub struct ApiFailure {
	/// Failure classification.
	pub kind: FailureKind,
	/// HTTP status code, when a response was received.
	pub status: Option<u16>,
	/// Response body, when one was received.
	pub payload: Option<FailurePayload>,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
	/// Underlying transport error for failures that never produced a response.
	#[source]
	pub source: Option<BoxError>,
}
impl ApiFailure {
	/// Builds a failure from an HTTP status code and the raw response body.
	pub fn from_status(status: u16, body: &[u8]) -> Self {
		Self {
			kind: FailureKind::from_status(status),
			status: Some(status),
			payload: FailurePayload::from_body(body),
			retry_after: None,
			source: None,
		}
	}

	/// Wraps a transport-level error (DNS, TCP, TLS, request construction).
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self {
			kind: FailureKind::Other,
			status: None,
			payload: None,
			retry_after: None,
			source: Some(Box::new(src)),
		}
	}

	/// Attaches a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Returns `true` for HTTP 401 failures.
	pub fn is_unauthenticated(&self) -> bool {
		self.kind == FailureKind::Unauthenticated
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than HTTP(S) or cannot carry paths.
	#[error("Base URL `{url}` must be an http or https URL.")]
	UnsupportedBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint path is not absolute.
	#[error("The {endpoint} endpoint path must start with `/`: {path}.")]
	InvalidEndpointPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body is not the JSON shape the caller expected.
	#[error("Response body returned malformed JSON.")]
	Json {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Session response carried no usable access token.
	#[error("Session response is missing an access token.")]
	MissingAccessToken,
}

fn describe_failure(
	kind: &FailureKind,
	status: &Option<u16>,
	payload: &Option<FailurePayload>,
) -> String {
	let mut buf = match status {
		Some(status) => format!("API request failed with HTTP {status} ({kind})"),
		None => format!("API request failed before a response was received ({kind})"),
	};

	if let Some(message) = payload.as_ref().and_then(FailurePayload::message) {
		buf.push_str(": ");
		buf.push_str(message);
	}

	buf.push('.');

	buf
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= FailurePayload::PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf: String = body.chars().take(FailurePayload::PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}
