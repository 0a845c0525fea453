//! Authenticated identity records (user identifier, display name, marketplace role).

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Errors produced while validating identity fields.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentityError {
	/// The user identifier was empty.
	#[error("User identifier cannot be empty.")]
	EmptyId,
	/// The user identifier contains whitespace characters.
	#[error("User identifier contains whitespace.")]
	IdContainsWhitespace,
	/// The user identifier exceeded the allowed character count.
	#[error("User identifier exceeds {max} characters.")]
	IdTooLong {
		/// Maximum permitted character count.
		max: usize,
	},
	/// The role name is not one of the marketplace roles.
	#[error("Unknown role `{role}`.")]
	UnknownRole {
		/// Role name received from the backend.
		role: String,
	},
}

/// Backend user identifier.
///
/// The API emits numeric or string identifiers depending on the resource, so both JSON shapes
/// deserialize into the same validated string form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawUserId", into = "String")]
pub struct UserId(String);
impl UserId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentityError> {
		let view = value.as_ref();

		validate_id(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for UserId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<UserId> for String {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl TryFrom<RawUserId> for UserId {
	type Error = IdentityError;

	fn try_from(value: RawUserId) -> Result<Self, Self::Error> {
		match value {
			RawUserId::Text(text) => {
				validate_id(&text)?;

				Ok(Self(text))
			},
			RawUserId::Number(number) => Ok(Self(number.to_string())),
		}
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "UserId({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for UserId {
	type Err = IdentityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
	Text(String),
	Number(u64),
}

/// Marketplace roles; each maps to one front-end surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
	/// Admin dashboard operator.
	Admin,
	/// Vendor dashboard operator.
	Vendor,
	/// Storefront shopper.
	#[default]
	Customer,
}
impl Role {
	/// Returns the canonical wire name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Admin => "admin",
			Self::Vendor => "vendor",
			Self::Customer => "customer",
		}
	}
}
impl From<Role> for String {
	fn from(value: Role) -> Self {
		value.as_str().to_owned()
	}
}
impl TryFrom<String> for Role {
	type Error = IdentityError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
impl FromStr for Role {
	type Err = IdentityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();

		if s.eq_ignore_ascii_case("admin") {
			Ok(Self::Admin)
		} else if s.eq_ignore_ascii_case("vendor") {
			Ok(Self::Vendor)
		} else if s.eq_ignore_ascii_case("customer") || s.eq_ignore_ascii_case("user") {
			Ok(Self::Customer)
		} else {
			Err(IdentityError::UnknownRole { role: s.to_owned() })
		}
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Identity attached to a credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Backend user identifier.
	pub id: UserId,
	/// Display name shown in dashboards; empty when the backend omits it.
	#[serde(default, alias = "displayName", alias = "fullName")]
	pub name: String,
	/// Marketplace role; missing roles default to [`Role::Customer`].
	#[serde(default)]
	pub role: Role,
}

fn validate_id(view: &str) -> Result<(), IdentityError> {
	if view.is_empty() {
		return Err(IdentityError::EmptyId);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentityError::IdContainsWhitespace);
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentityError::IdTooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_id_accepts_numbers_and_strings() {
		let numeric: UserId =
			serde_json::from_str("42").expect("Numeric identifiers should deserialize.");
		let text: UserId =
			serde_json::from_str("\"usr_42\"").expect("String identifiers should deserialize.");

		assert_eq!(numeric.as_ref(), "42");
		assert_eq!(text.as_ref(), "usr_42");
		assert!(serde_json::from_str::<UserId>("\"\"").is_err());
		assert!(serde_json::from_str::<UserId>("\"with space\"").is_err());
		assert!(UserId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn roles_parse_case_insensitively() {
		assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
		assert_eq!("Vendor".parse::<Role>(), Ok(Role::Vendor));
		assert_eq!("user".parse::<Role>(), Ok(Role::Customer));
		assert_eq!(
			"courier".parse::<Role>(),
			Err(IdentityError::UnknownRole { role: "courier".into() })
		);
	}

	#[test]
	fn identity_reads_aliases_and_defaults_role() {
		let identity: Identity = serde_json::from_str(r#"{"id":7,"displayName":"Ada"}"#)
			.expect("Identity fixture should deserialize.");

		assert_eq!(identity.id.as_ref(), "7");
		assert_eq!(identity.name, "Ada");
		assert_eq!(identity.role, Role::Customer);

		let encoded = serde_json::to_value(&identity).expect("Identity should serialize.");

		assert_eq!(encoded, serde_json::json!({ "id": "7", "name": "Ada", "role": "customer" }));
	}
}
