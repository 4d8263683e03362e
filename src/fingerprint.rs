//! Request fingerprints identify "the same" logical request for de-duplication.
//!
//! A fingerprint is `method:path`, followed by `:<json>` when the request carries a query
//! (for `GET`) or a body (for every other method). Object keys are written in sorted order,
//! so `{"a":1,"b":2}` and `{"b":2,"a":1}` produce the same fingerprint. Array order stays
//! significant.

// self
use crate::{_prelude::*, request::Method};

/// Stable de-duplication key for a request.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);
impl Fingerprint {
	/// Derives the fingerprint for a request.
	pub fn new(method: Method, path: &str, query: Option<&Value>, body: Option<&Value>) -> Self {
		let mut key = format!("{}:{}", method.label(), normalize_path(path));
		let payload = if method.is_read() { query } else { body };

		if let Some(payload) = payload.filter(|value| !value.is_null()) {
			key.push(':');
			write_canonical(payload, &mut key);
		}

		Self(key)
	}

	/// Returns the fingerprint text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Fingerprint {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for Fingerprint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Fingerprint({})", self.0)
	}
}
impl Display for Fingerprint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Trims whitespace and collapses leading slashes into exactly one.
pub fn normalize_path(path: &str) -> String {
	format!("/{}", path.trim().trim_start_matches('/'))
}

// Keys are sorted here rather than relying on `Value`'s map order, which becomes insertion
// order once any crate in the build enables `serde_json/preserve_order`.
fn write_canonical(value: &Value, buf: &mut String) {
	match value {
		Value::Object(map) => {
			let mut entries = map.iter().collect::<Vec<_>>();

			entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
			buf.push('{');

			for (idx, (key, value)) in entries.into_iter().enumerate() {
				if idx > 0 {
					buf.push(',');
				}

				buf.push_str(&Value::String(key.to_owned()).to_string());
				buf.push(':');
				write_canonical(value, buf);
			}

			buf.push('}');
		},
		Value::Array(items) => {
			buf.push('[');

			for (idx, item) in items.iter().enumerate() {
				if idx > 0 {
					buf.push(',');
				}

				write_canonical(item, buf);
			}

			buf.push(']');
		},
		scalar => buf.push_str(&scalar.to_string()),
	}
}
