//! Business response envelope: `{ code, message?, msg?, success?, data? }`.
//!
//! Servers answer with HTTP 200 even when an operation fails and report the real outcome
//! through the envelope's `code`. A payload without a `code` field is not an envelope and is
//! passed through untouched.

// self
use crate::_prelude::*;

/// Business codes treated as success.
pub const SUCCESS_CODES: [i64; 2] = [200, 0];
/// Message used when a failing envelope carries no text.
pub const FALLBACK_MESSAGE: &str = "Request failed";

/// Typed view over the envelope fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessEnvelope<T = Value> {
	/// Application-level status code.
	pub code: i64,
	/// Primary human-readable message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Alternate message field some services use.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub msg: Option<String>,
	/// Explicit success flag.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub success: Option<bool>,
	/// Operation payload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
}

/// HTTP-successful response whose envelope reports an application failure.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error(
	"Business request failed with code {code}: {message}.",
	message = envelope_message(.payload).unwrap_or(FALLBACK_MESSAGE)
)]
pub struct BusinessFailure {
	/// Application-level status code.
	pub code: i64,
	/// The full envelope as received.
	pub payload: Value,
}
impl BusinessFailure {
	/// Returns `message`, then `msg`, then a generic fallback.
	pub fn message(&self) -> &str {
		envelope_message(&self.payload).unwrap_or(FALLBACK_MESSAGE)
	}

	/// Returns the envelope's `data` field when present.
	pub fn data(&self) -> Option<&Value> {
		self.payload.get("data")
	}
}

/// Classification of a successfully received payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Classified {
	/// Envelope with a success code or flag; the envelope is returned as-is.
	Success(Value),
	/// No `code` field; the raw payload is returned as-is.
	Passthrough(Value),
	/// Envelope with a failure code.
	Failure(BusinessFailure),
}
impl Classified {
	/// Converts into the value handed to callers, or the failure.
	pub fn into_result(self) -> Result<Value, BusinessFailure> {
		match self {
			Self::Success(value) | Self::Passthrough(value) => Ok(value),
			Self::Failure(failure) => Err(failure),
		}
	}
}

/// Classifies a decoded payload against the envelope contract.
pub fn classify(payload: Value) -> Classified {
	let Some(code) = payload.get("code") else {
		return Classified::Passthrough(payload);
	};
	let code = code.as_i64().or_else(|| code.as_f64().and_then(integral_code));
	let flagged = payload.get("success").and_then(Value::as_bool) == Some(true);

	match code {
		Some(code) if SUCCESS_CODES.contains(&code) => Classified::Success(payload),
		_ if flagged => Classified::Success(payload),
		Some(code) => Classified::Failure(BusinessFailure { code, payload }),
		// Null, non-numeric, or fractional codes never equal a success code.
		None => Classified::Failure(BusinessFailure { code: -1, payload }),
	}
}

fn integral_code(value: f64) -> Option<i64> {
	(value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64)
		.then_some(value as i64)
}

/// Extracts `data` from an envelope, or the payload itself when it is not one.
pub fn unwrap_data(payload: Value) -> Value {
	match payload {
		Value::Object(mut map) if map.contains_key("code") =>
			map.remove("data").unwrap_or(Value::Null),
		other => other,
	}
}

pub(crate) fn envelope_message(payload: &Value) -> Option<&str> {
	["message", "msg"]
		.into_iter()
		.find_map(|key| payload.get(key).and_then(Value::as_str).filter(|text| !text.is_empty()))
}
