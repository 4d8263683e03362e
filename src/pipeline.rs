//! Interceptor pipeline: the pre-dispatch and post-dispatch stages every request passes through.
//!
//! [`Interceptors::before`] turns a descriptor into a [`TransportRequest`] and an [`InFlight`]
//! guard. The guard owns the registry entry, the progress ticket, and the loading overlay, and
//! releases all three exactly once, either in [`Interceptors::after`] or when it is dropped
//! because the dispatch future was abandoned.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	envelope,
	error::{ConfigError, DecodeError, HttpError, TransportError},
	fingerprint::{self, Fingerprint},
	http::{TransportRequest, TransportResponse},
	obs,
	progress::{LoadingGuard, ProgressCoordinator, ProgressTicket},
	registry::{self, CancelHandle, CancelSignal, PendingRegistry},
	request::{Method, RequestDescriptor},
	session::AuthSession,
	ui::{Notice, Surfaces},
};

/// Notice shown when a 401/403 response forces a logout.
pub const LOGIN_EXPIRED_MESSAGE: &str = "Login expired, please sign in again.";
/// Notice shown when no response was received.
pub const NETWORK_FAILURE_MESSAGE: &str =
	"Network connection failed, please check your network settings.";
/// Reason recorded on requests cancelled by a forced logout.
pub const SESSION_EXPIRED_REASON: &str = "session expired";

/// Header carrying the per-client request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
/// Header carrying the configured timezone label.
pub const TIMEZONE_HEADER: &str = "X-Timezone";
/// Header carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Descriptor resolved against the client configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
	/// HTTP method.
	pub method: Method,
	/// Normalized request path.
	pub path: String,
	/// Absolute target URL.
	pub url: Url,
	/// Query object, for `GET`.
	pub query: Option<Value>,
	/// JSON body, for every other method.
	pub body: Option<Value>,
}
impl PreparedRequest {
	/// Resolves the URL and routes the payload to the query string or the body.
	pub fn prepare(config: &ClientConfig, descriptor: &RequestDescriptor) -> Result<Self, ConfigError> {
		let path = fingerprint::normalize_path(&descriptor.path);
		let url = config.resolve(&path)?;
		let payload = descriptor.payload.clone().filter(|value| !value.is_null());
		let (query, body) =
			if descriptor.method.is_read() { (payload, None) } else { (None, payload) };

		if query.as_ref().is_some_and(|query| !query.is_object()) {
			return Err(ConfigError::InvalidQuery { path });
		}

		Ok(Self { method: descriptor.method, path, url, query, body })
	}

	/// De-duplication key for this request.
	pub fn fingerprint(&self) -> Fingerprint {
		Fingerprint::new(self.method, &self.path, self.query.as_ref(), self.body.as_ref())
	}

	/// Flattens the query object into ordered pairs.
	///
	/// `null` values are skipped, arrays repeat the key once per element, and nested objects
	/// are sent as JSON text.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		let Some(Value::Object(query)) = &self.query else {
			return Vec::new();
		};
		let mut pairs = Vec::with_capacity(query.len());

		for (key, value) in query {
			match value {
				Value::Null => {},
				Value::Array(items) =>
					for item in items.iter().filter(|item| !item.is_null()) {
						pairs.push((key.clone(), query_text(item)));
					},
				value => pairs.push((key.clone(), query_text(value))),
			}
		}

		pairs
	}
}

fn query_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

/// Per-request state held between the two pipeline stages.
///
/// Settling releases the registry entry, closes the loading overlay, and counts the request
/// out of the progress indicator, in that order. It runs once; dropping an unsettled guard
/// settles it.
pub struct InFlight<'a> {
	registry: &'a PendingRegistry,
	fingerprint: Fingerprint,
	entry: CancelHandle,
	ticket: Option<ProgressTicket>,
	loading: Option<LoadingGuard>,
	request_id: String,
	url: Url,
	show_error: bool,
	settled: bool,
}
impl InFlight<'_> {
	/// Cancellation signal the transport call is raced against.
	pub fn signal(&self) -> CancelSignal {
		self.entry.signal()
	}

	/// Value sent in the `X-Request-ID` header.
	pub fn request_id(&self) -> &str {
		&self.request_id
	}

	/// De-duplication key of the request.
	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	/// Releases every resource held for the request. Later calls are no-ops.
	pub fn settle(&mut self) {
		if self.settled {
			return;
		}

		self.settled = true;
		self.registry.settle(&self.fingerprint, self.entry.id());

		if let Some(mut loading) = self.loading.take() {
			loading.release();
		}
		if let Some(mut ticket) = self.ticket.take() {
			ticket.finish();
		}
	}

	/// Returns `true` once the request was settled.
	pub fn is_settled(&self) -> bool {
		self.settled
	}
}
impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.settle();
	}
}
impl Debug for InFlight<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InFlight")
			.field("fingerprint", &self.fingerprint)
			.field("request_id", &self.request_id)
			.field("settled", &self.settled)
			.finish()
	}
}

/// Shared state and behavior of the two pipeline stages.
pub struct Interceptors {
	config: ClientConfig,
	registry: PendingRegistry,
	progress: Arc<ProgressCoordinator>,
	session: AuthSession,
	surfaces: Surfaces,
	request_ids: AtomicU64,
}
impl Interceptors {
	/// Creates the pipeline state for one client.
	pub fn new(config: ClientConfig, session: AuthSession, surfaces: Surfaces) -> Self {
		let progress = Arc::new(ProgressCoordinator::new(surfaces.progress.clone()));

		Self {
			config,
			registry: PendingRegistry::default(),
			progress,
			session,
			surfaces,
			request_ids: AtomicU64::new(0),
		}
	}

	/// Pre-dispatch stage.
	///
	/// Registers the request (cancelling an identical one unless exempt), attaches the bearer,
	/// request-id, and timezone headers, and starts the progress indicator and loading overlay
	/// as the options ask. A descriptor that cannot be prepared is reported with the generic
	/// failure notice unless `show_error` is off.
	pub fn before(
		&self,
		descriptor: &RequestDescriptor,
	) -> Result<(TransportRequest, InFlight<'_>)> {
		let options = &descriptor.options;
		let prepared = match PreparedRequest::prepare(&self.config, descriptor) {
			Ok(prepared) => prepared,
			Err(e) => {
				if options.show_error {
					self.notify(Notice::error(envelope::FALLBACK_MESSAGE));
				}

				return Err(e.into());
			},
		};
		let fingerprint = prepared.fingerprint();
		let allow_duplicate =
			!options.cancel_duplicate || self.config.allow_duplicate.matches(&prepared.path);
		let registration = self.registry.register(&fingerprint, allow_duplicate);
		let request_id = self.next_request_id();
		let mut headers = BTreeMap::new();

		if let Some(bearer) = self.session.bearer() {
			headers.insert(AUTHORIZATION_HEADER.to_owned(), bearer);
		}

		headers.insert(REQUEST_ID_HEADER.to_owned(), request_id.clone());
		headers.insert(TIMEZONE_HEADER.to_owned(), self.config.timezone.clone());

		let ticket = options.show_progress.then(|| self.progress.start());
		let loading = options
			.loading
			.as_ref()
			.and_then(|target| LoadingGuard::acquire(self.surfaces.loading.as_ref(), target));
		let request = TransportRequest {
			method: prepared.method,
			query: prepared.query_pairs(),
			url: prepared.url.clone(),
			headers,
			body: prepared.body,
		};
		let in_flight = InFlight {
			registry: &self.registry,
			fingerprint,
			entry: registration.handle,
			ticket,
			loading,
			request_id,
			url: prepared.url,
			show_error: options.show_error,
			settled: false,
		};

		Ok((request, in_flight))
	}

	/// Post-dispatch stage.
	///
	/// `received` is `None` when the request was cancelled before a response arrived. The
	/// in-flight state is settled before the outcome is classified.
	pub async fn after(
		&self,
		mut in_flight: InFlight<'_>,
		received: Option<Result<TransportResponse, TransportError>>,
	) -> Result<Value> {
		in_flight.settle();

		let show_error = in_flight.show_error;
		let url = in_flight.url.clone();
		let signal = in_flight.signal();

		drop(in_flight);

		let response = match received {
			None => {
				let reason = signal.reason().unwrap_or_else(|| registry::DEFAULT_REASON.to_owned());

				return Err(Error::Aborted { reason });
			},
			Some(Err(e)) => {
				if show_error {
					self.notify(Notice::error(NETWORK_FAILURE_MESSAGE));
				}

				return Err(e.into());
			},
			Some(Ok(response)) => response,
		};

		if !response.is_success() {
			let err = HttpError::from_body(response.status, &response.body);

			if err.is_unauthorized() {
				self.force_logout().await;
			} else if show_error {
				self.notify(Notice::error(err.message.clone()));
			}

			return Err(err.into());
		}

		let payload = match decode_body(&url, &response) {
			Ok(payload) => payload,
			Err(e) => {
				if show_error {
					self.notify(Notice::error(envelope::FALLBACK_MESSAGE));
				}

				return Err(e.into());
			},
		};

		envelope::classify(payload).into_result().map_err(|failure| {
			if show_error {
				self.notify(Notice::error(failure.message()));
			}

			failure.into()
		})
	}

	/// Clears the session, cancels pending requests, tells the user, and navigates to the
	/// login route.
	///
	/// Storage failures are logged and otherwise ignored; the in-memory token is cleared
	/// regardless.
	pub async fn force_logout(&self) {
		if let Err(e) = self.session.sign_out().await {
			obs::log_swallowed("forced logout", &e);
		}

		self.registry.cancel_all(SESSION_EXPIRED_REASON);
		self.notify(Notice::error(LOGIN_EXPIRED_MESSAGE));
		self.surfaces.navigator.navigate(&self.config.login_route);
	}

	/// Allocates the next `req_<n>_<unix-millis>` request id.
	pub fn next_request_id(&self) -> String {
		let n = self.request_ids.fetch_add(1, Ordering::Relaxed) + 1;
		let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

		format!("req_{n}_{millis}")
	}

	/// Client configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Pending-request registry.
	pub fn registry(&self) -> &PendingRegistry {
		&self.registry
	}

	/// Progress coordinator.
	pub fn progress(&self) -> &Arc<ProgressCoordinator> {
		&self.progress
	}

	/// Auth session.
	pub fn session(&self) -> &AuthSession {
		&self.session
	}

	/// UI collaborators.
	pub fn surfaces(&self) -> &Surfaces {
		&self.surfaces
	}

	fn notify(&self, notice: Notice) {
		self.surfaces.notifier.notify(notice);
	}
}
impl Debug for Interceptors {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Interceptors")
			.field("config", &self.config)
			.field("pending", &self.registry.len())
			.field("progress", &self.progress.count())
			.field("session", &self.session)
			.finish()
	}
}

fn decode_body(url: &Url, response: &TransportResponse) -> Result<Value, DecodeError> {
	if response.body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	serde_json::from_slice(&response.body).map_err(|source| DecodeError::Body {
		url: url.to_string(),
		status: response.status,
		source,
	})
}
