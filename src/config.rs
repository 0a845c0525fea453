//! Gateway configuration: API base URL plus the session endpoint paths.

// self
use crate::{_prelude::*, error::ConfigError};

/// Validated gateway configuration.
///
/// Build it with [`GatewayConfig::builder`], or deserialize it (camelCase keys) from the
/// application's own configuration source; both paths run the same validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GatewayConfigBuilder", into = "GatewayConfigBuilder")]
pub struct GatewayConfig {
	base_url: Url,
	refresh_path: String,
	login_path: String,
	logout_path: String,
	request_timeout: Option<std::time::Duration>,
}
impl GatewayConfig {
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default login endpoint path.
	pub const DEFAULT_LOGIN_PATH: &'static str = "/auth/login";
	/// Default logout endpoint path.
	pub const DEFAULT_LOGOUT_PATH: &'static str = "/auth/logout";

	/// Creates a builder for the provided API base URL.
	pub fn builder(base_url: Url) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(base_url)
	}

	/// Parses `base_url` and returns a configuration using the default endpoint paths.
	pub fn from_base_url(base_url: &str) -> Result<Self, ConfigError> {
		let base_url =
			Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Self::builder(base_url).build()
	}

	/// API base URL every descriptor path is joined onto.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Refresh endpoint path.
	pub fn refresh_path(&self) -> &str {
		&self.refresh_path
	}

	/// Login endpoint path.
	pub fn login_path(&self) -> &str {
		&self.login_path
	}

	/// Logout endpoint path.
	pub fn logout_path(&self) -> &str {
		&self.logout_path
	}

	/// Per-request timeout applied by the built-in transport.
	pub fn request_timeout(&self) -> Option<std::time::Duration> {
		self.request_timeout
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") || self.base_url.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedBaseUrl { url: self.base_url.to_string() });
		}

		validate_path("refresh", &self.refresh_path)?;
		validate_path("login", &self.login_path)?;
		validate_path("logout", &self.logout_path)?;

		Ok(())
	}
}

/// Builder (and serde shape) for [`GatewayConfig`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfigBuilder {
	/// API base URL.
	pub base_url: Url,
	/// Refresh endpoint path.
	#[serde(default = "default_refresh_path")]
	pub refresh_path: String,
	/// Login endpoint path.
	#[serde(default = "default_login_path")]
	pub login_path: String,
	/// Logout endpoint path.
	#[serde(default = "default_logout_path")]
	pub logout_path: String,
	/// Per-request timeout in milliseconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_timeout_ms: Option<u64>,
}
impl GatewayConfigBuilder {
	/// Creates a builder seeded with the default endpoint paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: default_refresh_path(),
			login_path: default_login_path(),
			logout_path: default_logout_path(),
			request_timeout_ms: None,
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the logout endpoint path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.logout_path = path.into();

		self
	}

	/// Sets a per-request timeout.
	pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, ConfigError> {
		let config = GatewayConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			logout_path: self.logout_path,
			request_timeout: self.request_timeout_ms.map(std::time::Duration::from_millis),
		};

		config.validate()?;

		Ok(config)
	}
}
impl TryFrom<GatewayConfigBuilder> for GatewayConfig {
	type Error = ConfigError;

	fn try_from(builder: GatewayConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}
impl From<GatewayConfig> for GatewayConfigBuilder {
	fn from(config: GatewayConfig) -> Self {
		Self {
			base_url: config.base_url,
			refresh_path: config.refresh_path,
			login_path: config.login_path,
			logout_path: config.logout_path,
			request_timeout_ms: config
				.request_timeout
				.map(|timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
		}
	}
}

fn default_refresh_path() -> String {
	GatewayConfig::DEFAULT_REFRESH_PATH.into()
}

fn default_login_path() -> String {
	GatewayConfig::DEFAULT_LOGIN_PATH.into()
}

fn default_logout_path() -> String {
	GatewayConfig::DEFAULT_LOGOUT_PATH.into()
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidEndpointPath { endpoint, path: path.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse config fixture URL.")
	}

	#[test]
	fn builder_applies_defaults_and_overrides() {
		let config = GatewayConfig::builder(url("https://api.example.com/v1"))
			.refresh_path("/session/refresh")
			.request_timeout(std::time::Duration::from_secs(15))
			.build()
			.expect("Config with absolute paths should build.");

		assert_eq!(config.refresh_path(), "/session/refresh");
		assert_eq!(config.login_path(), GatewayConfig::DEFAULT_LOGIN_PATH);
		assert_eq!(config.logout_path(), GatewayConfig::DEFAULT_LOGOUT_PATH);
		assert_eq!(config.request_timeout(), Some(std::time::Duration::from_secs(15)));
	}

	#[test]
	fn builder_rejects_relative_paths_and_odd_schemes() {
		let err = GatewayConfig::builder(url("https://api.example.com"))
			.login_path("auth/login")
			.build()
			.expect_err("Relative endpoint paths must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpointPath { endpoint: "login", .. }));

		let err = GatewayConfig::builder(url("ftp://files.example.com"))
			.build()
			.expect_err("Non-HTTP schemes must be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedBaseUrl { .. }));
		assert!(matches!(
			GatewayConfig::from_base_url("not a url"),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
	}

	#[test]
	fn deserialization_runs_validation() {
		let config: GatewayConfig = serde_json::from_value(serde_json::json!({
			"baseUrl": "http://localhost:8080/api",
			"requestTimeoutMs": 2500,
		}))
		.expect("Config with defaults should deserialize.");

		assert_eq!(config.base_url().as_str(), "http://localhost:8080/api");
		assert_eq!(config.refresh_path(), GatewayConfig::DEFAULT_REFRESH_PATH);
		assert_eq!(config.request_timeout(), Some(std::time::Duration::from_millis(2500)));
		assert!(
			serde_json::from_value::<GatewayConfig>(serde_json::json!({
				"baseUrl": "http://localhost:8080",
				"refreshPath": "refresh",
			}))
			.is_err()
		);
	}
}
