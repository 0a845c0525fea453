//! Credential model plus the session payload returned by login and refresh endpoints.

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Identity},
	error::DecodeError,
};

/// Access credential held in the process-wide slot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Bearer token; callers must avoid logging it.
	pub access_token: AccessToken,
	/// Identity the backend associated with the token, when it sent one.
	pub identity: Option<Identity>,
	/// Instant the credential was obtained locally.
	pub obtained_at: OffsetDateTime,
}
impl Credential {
	/// Creates a credential obtained now.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: AccessToken::new(access_token),
			identity: None,
			obtained_at: OffsetDateTime::now_utc(),
		}
	}

	/// Attaches an identity record.
	pub fn with_identity(mut self, identity: Identity) -> Self {
		self.identity = Some(identity);

		self
	}

	/// Returns `true` when this credential carries the provided token.
	pub fn holds(&self, token: &AccessToken) -> bool {
		self.access_token == *token
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("identity", &self.identity)
			.field("obtained_at", &self.obtained_at)
			.finish()
	}
}

/// `{ accessToken, user? }` body returned by the login and refresh endpoints.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
	/// New bearer token.
	#[serde(default)]
	pub access_token: Option<String>,
	/// Identity record, when the endpoint includes one in a readable shape.
	#[serde(default, deserialize_with = "readable_identity")]
	pub user: Option<Identity>,
}
impl SessionPayload {
	/// Converts the payload into a credential obtained at `now`.
	///
	/// Fails with [`DecodeError::MissingAccessToken`] when the token is absent or blank.
	pub fn into_credential(self, now: OffsetDateTime) -> Result<Credential, DecodeError> {
		let token = self
			.access_token
			.filter(|token| !token.trim().is_empty())
			.ok_or(DecodeError::MissingAccessToken)?;

		Ok(Credential {
			access_token: AccessToken::new(token),
			identity: self.user,
			obtained_at: now,
		})
	}
}
impl Debug for SessionPayload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionPayload")
			.field("access_token_set", &self.access_token.is_some())
			.field("user", &self.user)
			.finish()
	}
}

// An unreadable `user` block is dropped; the token beside it is still honored.
fn readable_identity<'de, D>(deserializer: D) -> Result<Option<Identity>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<serde_json::Value>::deserialize(deserializer)?;

	Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::Role;

	#[test]
	fn payload_builds_credential_with_identity() {
		let payload: SessionPayload = serde_json::from_str(
			r#"{"accessToken":"t-2","user":{"id":"u-1","name":"Grace","role":"VENDOR"}}"#,
		)
		.expect("Session payload fixture should deserialize.");
		let now = macros::datetime!(2026-10-19 12:00 UTC);
		let credential =
			payload.into_credential(now).expect("Payload with a token should convert.");

		assert_eq!(credential.access_token.expose(), "t-2");
		assert_eq!(credential.obtained_at, now);

		let identity = credential.identity.expect("Identity should be carried over.");

		assert_eq!(identity.role, Role::Vendor);
		assert_eq!(identity.name, "Grace");
	}

	#[test]
	fn payload_without_token_is_rejected() {
		let now = OffsetDateTime::now_utc();

		for body in [r#"{}"#, r#"{"accessToken":"  "}"#, r#"{"user":{"id":1,"name":"x"}}"#] {
			let payload: SessionPayload =
				serde_json::from_str(body).expect("Payload fixture should deserialize.");

			assert!(matches!(payload.into_credential(now), Err(DecodeError::MissingAccessToken)));
		}
	}

	#[test]
	fn unreadable_identity_keeps_the_token() {
		let now = OffsetDateTime::now_utc();

		for body in [
			r#"{"accessToken":"t-2","user":{"id":"u-1","name":"Ops","role":"EMPLOYEE"}}"#,
			r#"{"accessToken":"t-2","user":{"id":"has space"}}"#,
			r#"{"accessToken":"t-2","user":"u-1"}"#,
		] {
			let payload: SessionPayload =
				serde_json::from_str(body).expect("Payload with a token should deserialize.");
			let credential =
				payload.into_credential(now).expect("Token should survive a bad identity.");

			assert_eq!(credential.access_token.expose(), "t-2");
			assert!(credential.identity.is_none());
		}

		let payload: SessionPayload =
			serde_json::from_str(r#"{"accessToken":"t-3","user":{"id":5,"role":"admin"}}"#)
				.expect("Identity without a name should deserialize.");
		let identity = payload
			.into_credential(now)
			.expect("Payload with a token should convert.")
			.identity
			.expect("Nameless identity should be kept.");

		assert_eq!(identity.role, Role::Admin);
		assert!(identity.name.is_empty());
	}

	#[test]
	fn credential_debug_redacts_token() {
		let credential = Credential::new("secret-token");
		let rendered = format!("{credential:?}");

		assert!(!rendered.contains("secret-token"));
		assert!(rendered.contains("<redacted>"));
		assert!(credential.holds(&AccessToken::new("secret-token")));
	}
}
