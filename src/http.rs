//! Transport primitives for dispatched requests.
//!
//! [`HttpTransport`] is the dispatcher's only dependency on an HTTP stack. The pipeline hands
//! it a fully prepared [`TransportRequest`] and races the returned future against the request's
//! cancellation signal; a cancelled future is dropped, which aborts the underlying call.
//! Implementations report a received response (any status) as `Ok` and reserve
//! [`TransportError`] for exchanges where no response arrived.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError, request::Method};
#[cfg(feature = "reqwest")] use crate::{config::ClientConfig, error::ConfigError};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute a prepared request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back a shared client,
/// and the returned futures must be `Send` so dispatch futures can hop executors.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the response, whatever its status.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}
impl<T> HttpTransport for Arc<T>
where
	T: HttpTransport,
{
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		(**self).send(request)
	}
}

/// Fully resolved request handed to the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL without the query string.
	pub url: Url,
	/// Query parameters, in order.
	pub query: Vec<(String, String)>,
	/// Request headers keyed by their canonical name.
	pub headers: BTreeMap<String, String>,
	/// JSON body.
	pub body: Option<Value>,
}
impl TransportRequest {
	/// Returns a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Response as received from the server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers with lower-case names.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Builds a JSON response; used by custom transports and test doubles.
	pub fn json(status: u16, body: &Value) -> Self {
		Self {
			status,
			headers: BTreeMap::from([("content-type".into(), "application/json".into())]),
			body: body.to_string().into_bytes(),
		}
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with the configured timeout and a JSON content type.
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(config.timeout)
			.default_headers(Self::default_headers())
			.build()?;

		Ok(Self(client))
	}

	fn default_headers() -> reqwest::header::HeaderMap {
		let mut headers = reqwest::header::HeaderMap::new();

		headers.insert(
			reqwest::header::CONTENT_TYPE,
			reqwest::header::HeaderValue::from_static("application/json;charset=utf-8"),
		);

		headers
	}

	fn method(method: Method) -> reqwest::Method {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
			Method::Patch => reqwest::Method::PATCH,
		}
	}

	fn map_error(url: &Url, e: ReqwestError) -> TransportError {
		if e.is_timeout() {
			TransportError::Timeout { url: url.to_string() }
		} else {
			TransportError::network(url.as_str(), e)
		}
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let TransportRequest { method, url, query, headers, body } = request;
			let mut builder = self.0.request(Self::method(method), url.clone());

			if !query.is_empty() {
				builder = builder.query(&query);
			}
			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = &body {
				builder = builder.json(body);
			}

			let response = builder.send().await.map_err(|e| Self::map_error(&url, e))?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await.map_err(|e| Self::map_error(&url, e))?.to_vec();

			Ok(TransportResponse { status, headers, body })
		})
	}
}
