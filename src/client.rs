//! Dispatch facade: the single entry point applications call.
//!
//! A [`Client`] owns every piece of per-application request state: the pending-request
//! registry, the progress counter, the auth session, and the request-id counter. Independent
//! clients never share state, so tests and multi-tenant hosts can run several side by side.

mod stats;

pub use stats::DispatchStats;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	envelope::{self, BusinessFailure},
	error::DecodeError,
	http::HttpTransport,
	obs::{self, DispatchEvent, DispatchSpan},
	pipeline::Interceptors,
	request::{Method, RequestDescriptor},
	session::AuthSession,
	store::KeyValueStore,
	ui::{Notice, ShowWarn, Surfaces},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Reason recorded on requests cancelled by an explicit sign-out.
pub const SIGNED_OUT_REASON: &str = "signed out";

/// Client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestDispatchClient = Client<ReqwestTransport>;

/// Settled dispatch, split along the error taxonomy.
#[derive(Debug)]
pub enum Outcome {
	/// HTTP and envelope both succeeded, or the payload carried no envelope.
	Success(Value),
	/// HTTP succeeded but the envelope reported a failure.
	BusinessFailure(BusinessFailure),
	/// Error status, missing response, or a response that could not be interpreted.
	TransportFailure(Error),
	/// Superseded by a duplicate or cancelled explicitly.
	Cancelled {
		/// Recorded cancellation reason.
		reason: String,
	},
}
impl Outcome {
	/// Returns `true` for [`Outcome::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	/// Returns the payload of a successful dispatch.
	pub fn success(self) -> Option<Value> {
		match self {
			Self::Success(value) => Some(value),
			_ => None,
		}
	}
}
impl From<Result<Value>> for Outcome {
	fn from(result: Result<Value>) -> Self {
		match result {
			Ok(value) => Self::Success(value),
			Err(Error::Business(failure)) => Self::BusinessFailure(failure),
			Err(Error::Aborted { reason }) => Self::Cancelled { reason },
			Err(e) => Self::TransportFailure(e),
		}
	}
}

/// Request dispatcher bound to one transport, session, and set of UI surfaces.
pub struct Client<T>
where
	T: HttpTransport,
{
	transport: T,
	interceptors: Interceptors,
	stats: DispatchStats,
}
impl<T> Client<T>
where
	T: HttpTransport,
{
	/// Assembles a client around an existing session.
	pub fn new(config: ClientConfig, transport: T, session: AuthSession, surfaces: Surfaces) -> Self {
		Self {
			transport,
			interceptors: Interceptors::new(config, session, surfaces),
			stats: DispatchStats::default(),
		}
	}

	/// Assembles a client, restoring the token persisted in `store`.
	pub async fn connect(
		config: ClientConfig,
		transport: T,
		store: Arc<dyn KeyValueStore>,
		surfaces: Surfaces,
	) -> Result<Self> {
		let session = AuthSession::restore(store).await?;

		Ok(Self::new(config, transport, session, surfaces))
	}

	/// Runs the interceptor pipeline only.
	///
	/// No callbacks run and no success notice is shown; `show_progress` is honored as given.
	pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Value> {
		let span = DispatchSpan::new(descriptor.method, &descriptor.path);

		span.instrument(self.run(&descriptor, &span)).await
	}

	/// Dispatches a request and routes the outcome to the descriptor's callbacks.
	///
	/// The progress indicator is always driven. On success the success notice (if any) is shown
	/// before `on_success` runs; business failures go to `on_fail` together with a [`ShowWarn`]
	/// helper; every other failure except cancellation goes to `on_error`. The result is
	/// returned after the callbacks ran.
	pub async fn dispatch(&self, mut descriptor: RequestDescriptor) -> Result<Value> {
		let callbacks = descriptor.options.take_callbacks();
		let success_message = descriptor.options.success_message.take();
		let show_err_text = descriptor.options.show_err_text;

		descriptor.options.show_progress = true;

		let result = self.execute(descriptor).await;

		match &result {
			Ok(value) => {
				if let Some(message) = success_message.filter(|message| !message.is_empty()) {
					self.surfaces().notifier.notify(Notice::success(message));
				}
				if let Some(on_success) = callbacks.on_success {
					on_success(value);
				}
			},
			Err(Error::Business(failure)) =>
				if let Some(on_fail) = callbacks.on_fail {
					on_fail(failure, ShowWarn::new(self.surfaces().notifier.clone(), show_err_text));
				},
			Err(e) if e.is_aborted() => {},
			Err(e) =>
				if let Some(on_error) = callbacks.on_error {
					on_error(e);
				},
		}

		result
	}

	/// Same as [`dispatch`](Self::dispatch), folding the result into an [`Outcome`].
	pub async fn dispatch_outcome(&self, descriptor: RequestDescriptor) -> Outcome {
		self.dispatch(descriptor).await.into()
	}

	/// Same as [`dispatch`](Self::dispatch), decoding the envelope's `data` field (or the raw
	/// payload when there is no envelope) into `R`.
	pub async fn dispatch_as<R>(&self, descriptor: RequestDescriptor) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let path = descriptor.path.clone();
		let data = envelope::unwrap_data(self.dispatch(descriptor).await?);

		serde_path_to_error::deserialize(data)
			.map_err(|source| DecodeError::Data { path, source }.into())
	}

	/// Stores a new token for subsequent requests.
	pub async fn sign_in(&self, token: impl Into<String>) -> Result<()> {
		self.session().sign_in(token).await
	}

	/// Cancels every pending request and clears the session.
	pub async fn sign_out(&self) -> Result<()> {
		self.cancel_all(SIGNED_OUT_REASON);
		self.session().sign_out().await
	}

	/// Cancels every pending request. Returns how many were cancelled.
	pub fn cancel_all(&self, reason: &str) -> usize {
		self.interceptors.registry().cancel_all(reason)
	}

	/// Number of requests currently registered for de-duplication.
	pub fn pending_requests(&self) -> usize {
		self.interceptors.registry().len()
	}

	/// Number of requests currently driving the progress indicator.
	pub fn progress_count(&self) -> usize {
		self.interceptors.progress().count()
	}

	/// Auth session.
	pub fn session(&self) -> &AuthSession {
		self.interceptors.session()
	}

	/// Client configuration.
	pub fn config(&self) -> &ClientConfig {
		self.interceptors.config()
	}

	/// UI collaborators.
	pub fn surfaces(&self) -> &Surfaces {
		self.interceptors.surfaces()
	}

	/// Dispatch counters.
	pub fn stats(&self) -> &DispatchStats {
		&self.stats
	}

	/// Underlying transport.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	async fn run(&self, descriptor: &RequestDescriptor, span: &DispatchSpan) -> Result<Value> {
		let method = descriptor.method;

		self.record(method, DispatchEvent::Attempt);

		let (request, in_flight) = match self.interceptors.before(descriptor) {
			Ok(prepared) => prepared,
			Err(e) => {
				self.record(method, DispatchEvent::from(e.kind()));

				return Err(e);
			},
		};

		span.record_request_id(in_flight.request_id());

		let signal = in_flight.signal();
		let received = signal.run_until_cancelled(self.transport.send(request)).await;
		let result = self.interceptors.after(in_flight, received).await;

		self.record(method, DispatchEvent::settled(&result));

		result
	}

	fn record(&self, method: Method, event: DispatchEvent) {
		self.stats.record(event);
		obs::record_dispatch(method, event);
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Builds a reqwest-backed client from `config`, restoring the token persisted in `store`.
	pub async fn from_config(
		config: ClientConfig,
		store: Arc<dyn KeyValueStore>,
		surfaces: Surfaces,
	) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config)?;

		Self::connect(config, transport, store, surfaces).await
	}
}
impl<T> Debug for Client<T>
where
	T: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("interceptors", &self.interceptors)
			.field("stats", &self.stats)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		_preludet::{
			RecordingSurfaces, ScriptedTransport, SurfaceEvent, build_test_client_with, session_from,
			store_with_token,
		},
		envelope::FALLBACK_MESSAGE,
		error::ErrorKind,
		pipeline::{LOGIN_EXPIRED_MESSAGE, NETWORK_FAILURE_MESSAGE},
		registry::DUPLICATE_REASON,
		request::RequestOptions,
		session::TOKEN_KEY,
		store::MemoryStore,
		ui::{LoadingTarget, NoticeLevel},
	};

	async fn wait_for(mut condition: impl FnMut() -> bool) {
		for _ in 0..400 {
			if condition() {
				return;
			}

			tokio::time::sleep(Duration::from_millis(5)).await;
		}

		panic!("Condition was not reached in time.");
	}

	fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
		let counter = Arc::new(AtomicUsize::new(0));

		(counter.clone(), counter)
	}

	#[tokio::test]
	async fn duplicate_dispatch_aborts_prior_request() {
		let transport = ScriptedTransport::default();

		transport.respond("/user/list", 200, json!({ "code": 200, "data": [] }));

		let gate = transport.hold();
		let (client, recorder) = build_test_client_with(transport.clone(), store_with_token("abc"));
		let client = Arc::new(client);
		let (errors, errors_seen) = counter();
		let spawn = |errors: Option<Arc<AtomicUsize>>| {
			let client = client.clone();

			tokio::spawn(async move {
				let mut options =
					RequestOptions::default().loading(LoadingTarget::Selector("#table".into()));

				if let Some(errors) = errors {
					options = options.on_error(move |_| {
						errors.fetch_add(1, Ordering::SeqCst);
					});
				}

				client
					.dispatch(
						RequestDescriptor::get("/user/list").json(json!({ "page": 1 })).options(options),
					)
					.await
			})
		};
		let first = spawn(Some(errors));

		wait_for(|| transport.calls() == 1).await;

		let second = spawn(None);

		wait_for(|| transport.calls() == 2).await;

		let first = first.await.expect("First dispatch task should join.");

		assert!(matches!(first, Err(Error::Aborted { ref reason }) if reason == DUPLICATE_REASON));

		gate.cancel();

		let second = second.await.expect("Second dispatch task should join.");

		assert_eq!(second.expect("Second dispatch should succeed."), json!({ "code": 200, "data": [] }));
		assert_eq!(errors_seen.load(Ordering::SeqCst), 0);
		assert_eq!(client.pending_requests(), 0);
		assert_eq!(client.progress_count(), 0);
		assert_eq!(recorder.loading_closes(), 2);
		assert_eq!(recorder.count(&SurfaceEvent::ProgressStart), 1);
		assert_eq!(recorder.count(&SurfaceEvent::ProgressDone), 1);
		assert!(recorder.notices().is_empty());
		assert_eq!(client.stats().aborted(), 1);
		assert_eq!(client.stats().successes(), 1);
	}

	#[tokio::test]
	async fn opted_out_duplicates_run_concurrently() {
		let transport = ScriptedTransport::default();

		transport.respond("/system/stats", 200, json!({ "cpu": 3 }));

		let gate = transport.hold();
		let (client, _) = build_test_client_with(transport.clone(), store_with_token("abc"));
		let client = Arc::new(client);
		let spawn = || {
			let client = client.clone();

			tokio::spawn(async move {
				client
					.dispatch(
						RequestDescriptor::get("/system/stats")
							.configure(|options| options.cancel_duplicate(false)),
					)
					.await
			})
		};
		let first = spawn();
		let second = spawn();

		wait_for(|| transport.calls() == 2).await;
		gate.cancel();

		for task in [first, second] {
			let value = task
				.await
				.expect("Dispatch task should join.")
				.expect("Concurrent duplicate should succeed.");

			assert_eq!(value, json!({ "cpu": 3 }));
		}

		assert_eq!(client.pending_requests(), 0);
	}

	#[tokio::test]
	async fn success_notifies_then_calls_back_once() {
		let transport = ScriptedTransport::default();

		transport.respond("/user/create", 200, json!({ "code": 200, "data": { "x": 1 } }));

		let (client, recorder) = build_test_client_with(transport.clone(), store_with_token("abc"));
		let (calls, seen) = counter();
		let value = client
			.dispatch(
				RequestDescriptor::post("/user/create").json(json!({ "username": "ann" })).configure(
					|options| {
						options.success_message("User created successfully.").on_success(
							move |value| {
								assert_eq!(value["data"]["x"], 1);
								calls.fetch_add(1, Ordering::SeqCst);
							},
						)
					},
				),
			)
			.await
			.expect("Dispatch should succeed.");

		assert_eq!(value, json!({ "code": 200, "data": { "x": 1 } }));
		assert_eq!(seen.load(Ordering::SeqCst), 1);
		assert_eq!(
			recorder.notices(),
			vec![(NoticeLevel::Success, "User created successfully.".into())]
		);

		let request = &transport.requests()[0];

		assert_eq!(request.header("Authorization"), Some("Bearer abc"));
		assert_eq!(request.body, Some(json!({ "username": "ann" })));
	}

	#[tokio::test]
	async fn business_failure_reaches_on_fail_only() {
		let transport = ScriptedTransport::default();

		transport.respond("/user/create", 200, json!({ "code": 400, "msg": "bad" }));

		let (client, recorder) = build_test_client_with(transport, store_with_token("abc"));
		let (fails, fails_seen) = counter();
		let (successes, successes_seen) = counter();
		let err = client
			.dispatch(RequestDescriptor::post("/user/create").configure(|options| {
				options
					.show_error(false)
					.on_success(move |_| {
						successes.fetch_add(1, Ordering::SeqCst);
					})
					.on_fail(move |failure, warn| {
						assert_eq!(failure.code, 400);
						warn.show(failure.message());
						fails.fetch_add(1, Ordering::SeqCst);
					})
			}))
			.await
			.expect_err("Business failure should reject.");

		assert!(matches!(err, Error::Business(_)));
		assert_eq!(fails_seen.load(Ordering::SeqCst), 1);
		assert_eq!(successes_seen.load(Ordering::SeqCst), 0);
		// Only the ShowWarn helper surfaced the message.
		assert_eq!(recorder.notices(), vec![(NoticeLevel::Error, "bad".into())]);
	}

	#[tokio::test]
	async fn unauthorized_logs_out_once() {
		let transport = ScriptedTransport::default();

		transport.respond("/user/info", 401, json!({ "message": "token expired" }));

		let store = store_with_token("abc");
		let (client, recorder) = build_test_client_with(transport, store.clone());
		let (errors, errors_seen) = counter();
		let err = client
			.dispatch(RequestDescriptor::get("/user/info").configure(|options| {
				options.on_error(move |e| {
					assert_eq!(e.status(), Some(401));
					errors.fetch_add(1, Ordering::SeqCst);
				})
			}))
			.await
			.expect_err("401 should reject.");

		assert_eq!(err.status(), Some(401));
		assert_eq!(errors_seen.load(Ordering::SeqCst), 1);
		assert!(store.get_now(TOKEN_KEY).is_none());
		assert!(!client.session().is_logged_in());
		assert_eq!(recorder.navigations(), vec!["/login".to_owned()]);
		assert_eq!(recorder.notices(), vec![(NoticeLevel::Error, LOGIN_EXPIRED_MESSAGE.into())]);
	}

	#[tokio::test]
	async fn forbidden_logs_out_once() {
		let transport = ScriptedTransport::default();

		transport.respond("/system/config", 403, json!({ "msg": "forbidden" }));

		let store = store_with_token("abc");
		let (client, recorder) = build_test_client_with(transport.clone(), store.clone());
		let err = client
			.dispatch(RequestDescriptor::get("/system/config"))
			.await
			.expect_err("403 should reject.");

		assert_eq!(err.status(), Some(403));
		assert_eq!(transport.requests()[0].header("Authorization"), Some("Bearer abc"));
		assert!(store.get_now(TOKEN_KEY).is_none());
		assert!(!client.session().is_logged_in());
		assert_eq!(recorder.navigations(), vec!["/login".to_owned()]);
		assert_eq!(recorder.notices(), vec![(NoticeLevel::Error, LOGIN_EXPIRED_MESSAGE.into())]);
	}

	#[tokio::test]
	async fn rejected_descriptor_notifies_generic_failure() {
		let transport = ScriptedTransport::default();
		let (client, recorder) = build_test_client_with(transport.clone(), store_with_token("abc"));
		let (errors, errors_seen) = counter();
		let err = client
			.dispatch(RequestDescriptor::get("/user/list").json(json!([1, 2])).configure(|options| {
				options.on_error(move |_| {
					errors.fetch_add(1, Ordering::SeqCst);
				})
			}))
			.await
			.expect_err("Array query must be rejected.");

		assert_eq!(err.kind(), ErrorKind::Unclassified);
		assert_eq!(errors_seen.load(Ordering::SeqCst), 1);
		assert_eq!(transport.calls(), 0);
		assert_eq!(recorder.notices(), vec![(NoticeLevel::Error, FALLBACK_MESSAGE.into())]);
		assert_eq!(client.pending_requests(), 0);

		client
			.dispatch(
				RequestDescriptor::get("/user/list")
					.json(json!("page=1"))
					.configure(|options| options.show_error(false)),
			)
			.await
			.expect_err("String query must be rejected.");

		assert_eq!(recorder.notices().len(), 1);
	}

	#[tokio::test]
	async fn configured_rule_exempts_matching_paths() {
		let transport = ScriptedTransport::default();

		transport.respond("/heartbeat/ping", 200, json!({ "code": 0, "data": "pong" }));

		let gate = transport.hold();
		let recorder = RecordingSurfaces::default();
		let config = ClientConfig::builder()
			.base_url(Url::parse("http://127.0.0.1:9/api").expect("Fixture URL should parse."))
			.timezone("Asia/Shanghai")
			.allow_duplicate("/heartbeat*")
			.build()
			.expect("Configuration with a wildcard rule should be valid.");
		let client = Arc::new(Client::new(
			config,
			transport.clone(),
			session_from(store_with_token("abc")),
			recorder.surfaces(),
		));
		let spawn = || {
			let client = client.clone();

			tokio::spawn(async move { client.dispatch(RequestDescriptor::get("/heartbeat/ping")).await })
		};
		let first = spawn();
		let second = spawn();

		wait_for(|| transport.calls() == 2).await;
		gate.cancel();

		for task in [first, second] {
			let value = task
				.await
				.expect("Dispatch task should join.")
				.expect("Exempt duplicate must not be aborted.");

			assert_eq!(value["data"], "pong");
		}

		assert_eq!(client.stats().aborted(), 0);
		assert_eq!(client.stats().successes(), 2);
		assert_eq!(client.pending_requests(), 0);
	}

	#[tokio::test]
	async fn network_failure_is_transport_outcome() {
		let transport = ScriptedTransport::default();

		transport.fail("/system/config");

		let (client, recorder) = build_test_client_with(transport, Arc::new(MemoryStore::default()));
		let outcome = client.dispatch_outcome(RequestDescriptor::get("/system/config")).await;

		assert!(matches!(outcome, Outcome::TransportFailure(ref e) if e.status().is_none()));
		assert_eq!(recorder.notices(), vec![(NoticeLevel::Error, NETWORK_FAILURE_MESSAGE.into())]);
		assert_eq!(client.stats().transport_failures(), 1);
	}

	#[tokio::test]
	async fn dispatch_as_decodes_data_field() {
		#[derive(Debug, Deserialize)]
		struct Info {
			id: u64,
			name: String,
		}

		let transport = ScriptedTransport::default();

		transport.respond("/user/info", 200, json!({ "code": 0, "data": { "id": 7, "name": "ann" } }));
		transport.respond("/user/broken", 200, json!({ "code": 0, "data": { "id": "x" } }));

		let (client, _) = build_test_client_with(transport, store_with_token("abc"));
		let info: Info = client
			.dispatch_as(RequestDescriptor::get("/user/info"))
			.await
			.expect("Typed dispatch should succeed.");

		assert_eq!(info.id, 7);
		assert_eq!(info.name, "ann");

		let err = client
			.dispatch_as::<Info>(RequestDescriptor::get("/user/broken"))
			.await
			.expect_err("Mismatched data should fail to decode.");

		assert!(matches!(err, Error::Decode(DecodeError::Data { ref path, .. }) if path == "/user/broken"));
	}

	#[tokio::test]
	async fn execute_honors_show_progress_and_skips_callbacks() {
		let transport = ScriptedTransport::default();

		transport.respond("/system/stats", 200, json!({ "code": 200 }));

		let (client, recorder) = build_test_client_with(transport, store_with_token("abc"));
		let (calls, seen) = counter();

		client
			.execute(RequestDescriptor::get("/system/stats").configure(|options| {
				options.show_progress(false).success_message("done").on_success(move |_| {
					calls.fetch_add(1, Ordering::SeqCst);
				})
			}))
			.await
			.expect("Execute should succeed.");

		assert_eq!(seen.load(Ordering::SeqCst), 0);
		assert!(recorder.events().is_empty());
	}

	#[tokio::test]
	async fn dropped_dispatch_releases_everything() {
		let transport = ScriptedTransport::default();

		transport.respond("/product/list", 200, json!({ "code": 200 }));

		let _gate = transport.hold();
		let (client, recorder) = build_test_client_with(transport.clone(), store_with_token("abc"));
		let client = Arc::new(client);
		let task = tokio::spawn({
			let client = client.clone();

			async move {
				client
					.dispatch(
						RequestDescriptor::get("/product/list")
							.configure(|options| options.loading(LoadingTarget::Element(9))),
					)
					.await
			}
		});

		wait_for(|| transport.calls() == 1).await;
		task.abort();

		let _ = task.await;

		assert_eq!(client.pending_requests(), 0);
		assert_eq!(client.progress_count(), 0);
		assert_eq!(recorder.loading_closes(), 1);
	}

	#[tokio::test]
	async fn sign_out_cancels_pending_and_clears_token() {
		let transport = ScriptedTransport::default();

		transport.respond("/product/list", 200, json!({ "code": 200 }));

		let _gate = transport.hold();
		let store = store_with_token("abc");
		let (client, _) = build_test_client_with(transport.clone(), store.clone());
		let client = Arc::new(client);
		let task = tokio::spawn({
			let client = client.clone();

			async move { client.dispatch_outcome(RequestDescriptor::get("/product/list")).await }
		});

		wait_for(|| transport.calls() == 1).await;
		client.sign_out().await.expect("Sign out should succeed.");

		let outcome = task.await.expect("Dispatch task should join.");

		assert!(matches!(outcome, Outcome::Cancelled { ref reason } if reason == SIGNED_OUT_REASON));
		assert!(store.get_now(TOKEN_KEY).is_none());
		assert_eq!(client.pending_requests(), 0);
	}

	#[tokio::test]
	async fn connect_restores_token() {
		let transport = ScriptedTransport::default();
		let client = Client::connect(
			crate::_preludet::test_config("http://127.0.0.1:9/api"),
			transport,
			store_with_token("persisted"),
			Surfaces::default(),
		)
		.await
		.expect("Connect should succeed.");

		assert_eq!(client.session().bearer().as_deref(), Some("Bearer persisted"));
	}
}
