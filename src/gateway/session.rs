//! Login and logout: the only operations besides refresh that mutate the credential store.

// self
use crate::{
	_prelude::*,
	auth::{Credential, SessionPayload},
	gateway::Gateway,
	http::Transport,
	obs::{self, OpKind, OpScope},
	request::RequestDescriptor,
};

/// Credentials posted to the login endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
	/// Account email.
	pub email: String,
	/// Account password; never logged.
	pub password: String,
}
impl LoginRequest {
	/// Creates a login request.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

impl<T> Gateway<T>
where
	T: ?Sized + Transport,
{
	/// Exchanges `request` for a credential and stores it.
	///
	/// The login call is sent without a credential and never enters the refresh path; its
	/// failures (401 for bad credentials included) are returned classified.
	pub async fn login(&self, request: &LoginRequest) -> Result<Credential> {
		let scope = OpScope::begin(OpKind::Login, self.config.login_path());
		let result: Result<Credential> = scope
			.run(async move {
				let descriptor =
					RequestDescriptor::post(self.config.login_path()).with_json(request)?;
				let response = self.transport.send(&descriptor, None).await?;
				let credential = response
					.json::<SessionPayload>()?
					.into_credential(OffsetDateTime::now_utc())?;

				self.store.set(credential.clone());

				Ok(credential)
			})
			.await;

		scope.finish(&result);

		result
	}

	/// Tells the backend the session is over, then clears the store.
	///
	/// The backend call is best effort: its failure is recorded but the local credential is
	/// cleared regardless. Without a credential no call is made.
	pub async fn logout(&self) {
		let scope = OpScope::begin(OpKind::Logout, self.config.logout_path());

		scope
			.run(async move {
				if let Some(current) = self.store.get() {
					let descriptor = RequestDescriptor::post(self.config.logout_path());

					if let Err(failure) =
						self.transport.send(&descriptor, Some(&current.access_token)).await
					{
						obs::trace_logout_failure(&failure);
					}
				}

				self.store.clear();
			})
			.await;

		scope.succeed();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn login_request_redacts_password() {
		let request = LoginRequest::new("vendor@example.com", "hunter2");
		let rendered = format!("{request:?}");

		assert!(rendered.contains("vendor@example.com"));
		assert!(!rendered.contains("hunter2"));
		assert_eq!(
			serde_json::to_value(&request).expect("Login request should serialize."),
			serde_json::json!({ "email": "vendor@example.com", "password": "hunter2" })
		);
	}
}
