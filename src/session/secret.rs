//! Redacted wrapper for the bearer token.

// self
use crate::_prelude::*;

/// Bearer token kept out of logs and debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken(String);
impl AuthToken {
	/// Wraps a token. Surrounding whitespace is trimmed; blank input yields `None`.
	pub fn new(value: impl Into<String>) -> Option<Self> {
		let value = value.into();
		let trimmed = value.trim();

		if trimmed.is_empty() {
			return None;
		}

		Some(Self(if trimmed.len() == value.len() { value } else { trimmed.to_owned() }))
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the `Authorization` header value.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for AuthToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AuthToken").field(&"<redacted>").finish()
	}
}
impl Display for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
