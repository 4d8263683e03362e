//! Dispatch-level error types shared by the pipeline, the facade, and the storage layer.

// self
use crate::{
	_prelude::*,
	envelope::{self, BusinessFailure},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical dispatch error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A response arrived with a non-2xx status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// No response arrived (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// HTTP succeeded but the envelope reported an application failure.
	#[error(transparent)]
	Business(#[from] BusinessFailure),
	/// The response could not be interpreted.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The request was superseded by a duplicate or cancelled explicitly.
	#[error("Request was aborted: {reason}.")]
	Aborted {
		/// Reason recorded by whoever triggered the cancellation.
		reason: String,
	},
}
impl Error {
	/// Classifies the error for callback routing and notification decisions.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Aborted { .. } => ErrorKind::Aborted,
			Self::Http(_) | Self::Transport(_) => ErrorKind::Transport,
			Self::Business(_) => ErrorKind::Business,
			Self::Decode(_) | Self::Config(_) | Self::Storage(_) => ErrorKind::Unclassified,
		}
	}

	/// Returns `true` when the request was cancelled rather than failed.
	pub fn is_aborted(&self) -> bool {
		matches!(self, Self::Aborted { .. })
	}

	/// HTTP status attached to the failure, when a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http(err) => Some(err.status),
			Self::Decode(DecodeError::Body { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Error taxonomy used when routing failures to callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Cancelled; never surfaced to the user.
	Aborted,
	/// Error status or missing response.
	Transport,
	/// Envelope-level failure on a successful HTTP exchange.
	Business,
	/// Anything else (decode or local failures).
	Unclassified,
}
impl ErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::Aborted => "aborted",
			ErrorKind::Transport => "transport",
			ErrorKind::Business => "business",
			ErrorKind::Unclassified => "unclassified",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Response received with an error status.
#[derive(Debug, ThisError)]
#[error("Request failed with HTTP status {status}: {message}.")]
pub struct HttpError {
	/// HTTP status code.
	pub status: u16,
	/// User-facing message extracted from the body, or a generic fallback.
	pub message: String,
	/// Decoded body, when it was JSON.
	pub body: Option<Value>,
}
impl HttpError {
	/// Builds an error from a status code and raw body bytes.
	pub fn from_body(status: u16, body: &[u8]) -> Self {
		let body = serde_json::from_slice::<Value>(body).ok();
		let message = body
			.as_ref()
			.and_then(envelope::envelope_message)
			.map(ToOwned::to_owned)
			.unwrap_or_else(|| format!("Request failed ({status})"));

		Self { status, message, body }
	}

	/// Returns `true` for statuses that force a logout.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self.status, 401 | 403)
	}
}

/// Configuration and validation failures raised while building the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No base URL was provided.
	#[error("Base URL is required.")]
	MissingBaseUrl,
	/// Environment variable holds an unusable value.
	#[error("Environment variable `{name}` has an invalid value `{value}`.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Offending value.
		value: String,
	},
	/// Base URL cannot be used to resolve request paths.
	#[error("Base URL `{url}` cannot be used as a base for request paths.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Base URL could not be parsed.
	#[error("Base URL could not be parsed.")]
	UnparsableBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request path could not be joined with the base URL.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Login route must be an absolute application route.
	#[error("Login route `{route}` must start with `/`.")]
	InvalidLoginRoute {
		/// Offending route.
		route: String,
	},
	/// Timeout must be positive.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
	/// Allow-duplicate pattern could not be compiled.
	#[error("Allow-duplicate pattern `{pattern}` is invalid.")]
	InvalidPattern {
		/// Offending pattern.
		pattern: String,
		/// Underlying regex failure.
		#[source]
		source: regex::Error,
	},
	/// Query parameters must be a JSON object.
	#[error("Query parameters for `{path}` must be a JSON object.")]
	InvalidQuery {
		/// Request path.
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

/// Transport-level failures where no response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling `{url}`.")]
	Network {
		/// Target URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The transport gave up waiting for a response.
	#[error("Request to `{url}` timed out.")]
	Timeout {
		/// Target URL.
		url: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

/// Failures interpreting a received response.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON.
	#[error("Response body from `{url}` is not valid JSON.")]
	Body {
		/// Target URL.
		url: String,
		/// HTTP status code.
		status: u16,
		/// JSON parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Payload did not match the requested type.
	#[error("Response data from `{path}` does not match the expected shape.")]
	Data {
		/// Request path.
		path: String,
		/// Structured decoding failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request payload could not be serialized.
	#[error("Request payload could not be serialized.")]
	Payload(#[source] serde_json::Error),
}
