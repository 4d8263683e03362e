//! Request dispatch layer for business platforms: de-duplicated, cancellable, instrumented HTTP
//! calls with bearer-token injection, business-envelope classification, and unified
//! success/error routing.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod obs;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod request;
pub mod services;
pub mod session;
pub mod store;
pub mod ui;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use tokio_util::sync::CancellationToken;
	// self
	#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
	use crate::{
		client::Client,
		config::ClientConfig,
		error::TransportError,
		http::{HttpTransport, TransportFuture, TransportRequest, TransportResponse},
		session::{AuthSession, AuthToken, TOKEN_KEY},
		store::MemoryStore,
		ui::{
			LoadingOverlay, LoadingSurface, LoadingTarget, Navigator, Notice, NoticeLevel,
			Notifier, ProgressIndicator, Surfaces,
		},
	};

	/// Every interaction a [`RecordingSurfaces`] observed, in order.
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub enum SurfaceEvent {
		/// A notice reached the notifier.
		Notice(NoticeLevel, String),
		/// The progress indicator was started.
		ProgressStart,
		/// The progress indicator was finished.
		ProgressDone,
		/// A loading overlay was opened for the described target.
		LoadingOpen(String),
		/// A loading overlay was closed for the described target.
		LoadingClose(String),
		/// The navigator was asked to visit a route.
		Navigate(String),
	}

	/// UI surface double that records every call for later assertions.
	#[derive(Clone, Debug, Default)]
	pub struct RecordingSurfaces {
		events: Arc<Mutex<Vec<SurfaceEvent>>>,
		unresolvable: Arc<Mutex<Vec<String>>>,
		closes: Arc<AtomicUsize>,
	}
	impl RecordingSurfaces {
		/// Returns a snapshot of the recorded events.
		pub fn events(&self) -> Vec<SurfaceEvent> {
			self.events.lock().clone()
		}

		/// Returns the notices recorded so far.
		pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
			self.events
				.lock()
				.iter()
				.filter_map(|event| match event {
					SurfaceEvent::Notice(level, message) => Some((*level, message.clone())),
					_ => None,
				})
				.collect()
		}

		/// Returns the routes the navigator visited.
		pub fn navigations(&self) -> Vec<String> {
			self.events
				.lock()
				.iter()
				.filter_map(|event| match event {
					SurfaceEvent::Navigate(route) => Some(route.clone()),
					_ => None,
				})
				.collect()
		}

		/// Counts how many times `event` was recorded.
		pub fn count(&self, event: &SurfaceEvent) -> usize {
			self.events.lock().iter().filter(|recorded| *recorded == event).count()
		}

		/// Total number of loading overlays closed.
		pub fn loading_closes(&self) -> usize {
			self.closes.load(Ordering::SeqCst)
		}

		/// Makes loading targets with the given description fail to resolve.
		pub fn refuse_target(&self, description: impl Into<String>) {
			self.unresolvable.lock().push(description.into());
		}

		/// Bundles the recorder into a [`Surfaces`] value.
		pub fn surfaces(&self) -> Surfaces {
			let shared = Arc::new(self.clone());

			Surfaces {
				notifier: shared.clone(),
				loading: shared.clone(),
				progress: shared.clone(),
				navigator: shared,
			}
		}

		fn push(&self, event: SurfaceEvent) {
			self.events.lock().push(event);
		}
	}
	impl Notifier for RecordingSurfaces {
		fn notify(&self, notice: Notice) {
			self.push(SurfaceEvent::Notice(notice.level, notice.message));
		}
	}
	impl ProgressIndicator for RecordingSurfaces {
		fn start(&self) {
			self.push(SurfaceEvent::ProgressStart);
		}

		fn done(&self) {
			self.push(SurfaceEvent::ProgressDone);
		}
	}
	impl Navigator for RecordingSurfaces {
		fn navigate(&self, route: &str) {
			self.push(SurfaceEvent::Navigate(route.to_owned()));
		}
	}
	impl LoadingSurface for RecordingSurfaces {
		fn acquire(&self, target: &LoadingTarget) -> Option<Box<dyn LoadingOverlay>> {
			let description = target.to_string();

			if self.unresolvable.lock().contains(&description) {
				return None;
			}

			self.push(SurfaceEvent::LoadingOpen(description.clone()));

			Some(Box::new(RecordedOverlay { recorder: self.clone(), description }))
		}
	}

	struct RecordedOverlay {
		recorder: RecordingSurfaces,
		description: String,
	}
	impl LoadingOverlay for RecordedOverlay {
		fn close(self: Box<Self>) {
			self.recorder.closes.fetch_add(1, Ordering::SeqCst);
			self.recorder.push(SurfaceEvent::LoadingClose(self.description));
		}
	}

	#[derive(Clone, Debug)]
	enum ScriptedReply {
		Respond(TransportResponse),
		Fail,
	}

	/// Transport double that answers from a route table and records every request.
	///
	/// Routes match when the request URL path ends with the registered path. Unknown routes
	/// answer `404`.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedTransport {
		routes: Arc<Mutex<Vec<(String, ScriptedReply)>>>,
		requests: Arc<Mutex<Vec<TransportRequest>>>,
		gate: Arc<Mutex<Option<CancellationToken>>>,
	}
	impl ScriptedTransport {
		/// Answers requests to `path` with `status` and a JSON `body`.
		pub fn respond(&self, path: &str, status: u16, body: Value) {
			self.routes
				.lock()
				.push((path.to_owned(), ScriptedReply::Respond(TransportResponse::json(status, &body))));
		}

		/// Fails requests to `path` as if the connection was refused.
		pub fn fail(&self, path: &str) {
			self.routes.lock().push((path.to_owned(), ScriptedReply::Fail));
		}

		/// Holds every later response until the returned token is cancelled.
		pub fn hold(&self) -> CancellationToken {
			let gate = CancellationToken::new();

			*self.gate.lock() = Some(gate.clone());

			gate
		}

		/// Requests received so far, in arrival order.
		pub fn requests(&self) -> Vec<TransportRequest> {
			self.requests.lock().clone()
		}

		/// Number of requests received so far.
		pub fn calls(&self) -> usize {
			self.requests.lock().len()
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
			let reply = self
				.routes
				.lock()
				.iter()
				.rev()
				.find(|(path, _)| request.url.path().ends_with(path.as_str()))
				.map(|(_, reply)| reply.clone());
			let gate = self.gate.lock().clone();

			self.requests.lock().push(request);

			Box::pin(async move {
				if let Some(gate) = gate {
					gate.cancelled().await;
				}

				match reply {
					Some(ScriptedReply::Respond(response)) => Ok(response),
					Some(ScriptedReply::Fail) => Err(TransportError::Io(std::io::Error::new(
						std::io::ErrorKind::ConnectionRefused,
						"connection refused",
					))),
					None => Ok(TransportResponse::json(404, &serde_json::json!({ "message": "Not Found" }))),
				}
			})
		}
	}

	/// Builds a [`ClientConfig`] pointed at `base_url` with a fixed timezone label.
	pub fn test_config(base_url: &str) -> ClientConfig {
		ClientConfig::builder()
			.base_url(Url::parse(base_url).expect("Test base URL should parse."))
			.timezone("Asia/Shanghai")
			.build()
			.expect("Test client configuration should be valid.")
	}

	/// In-memory store seeded with an auth token.
	pub fn store_with_token(token: &str) -> Arc<MemoryStore> {
		let store = Arc::new(MemoryStore::default());

		store.insert_now(TOKEN_KEY, token);

		store
	}

	/// Session over `store`, seeded synchronously from its persisted token.
	pub fn session_from(store: Arc<MemoryStore>) -> AuthSession {
		let token = store.get_now(TOKEN_KEY).and_then(AuthToken::new);

		AuthSession::from_token(store, token)
	}

	/// Wraps any transport into a client backed by recording surfaces and `store`.
	pub fn build_test_client_with<T>(transport: T, store: Arc<MemoryStore>) -> (Client<T>, RecordingSurfaces)
	where
		T: HttpTransport,
	{
		let recorder = RecordingSurfaces::default();
		let client = Client::new(
			test_config("http://127.0.0.1:9/api"),
			transport,
			session_from(store),
			recorder.surfaces(),
		);

		(client, recorder)
	}

	/// Builds a reqwest-backed client pointed at `base_url` with recording surfaces.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(
		base_url: &str,
		store: Arc<MemoryStore>,
	) -> (Client<ReqwestTransport>, RecordingSurfaces) {
		let recorder = RecordingSurfaces::default();
		let config = test_config(base_url);
		let transport = ReqwestTransport::from_config(&config)
			.expect("Failed to build Reqwest transport for tests.");
		let client = Client::new(config, transport, session_from(store), recorder.surfaces());

		(client, recorder)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
