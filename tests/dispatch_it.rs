#![cfg(feature = "reqwest")]

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use request_broker::{
	_preludet::*,
	error::{Error, ErrorKind},
	pipeline::{LOGIN_EXPIRED_MESSAGE, NETWORK_FAILURE_MESSAGE},
	registry::DUPLICATE_REASON,
	request::{RequestDescriptor, RequestOptions},
	session::TOKEN_KEY,
	store::MemoryStore,
	ui::NoticeLevel,
};

#[tokio::test]
async fn success_attaches_headers_and_returns_envelope() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/user/list")
				.query_param("page", "1")
				.query_param("keyword", "ann")
				.header("authorization", "Bearer tk-1")
				.header("x-timezone", "Asia/Shanghai")
				.header_exists("x-request-id");
			then.status(200).json_body(json!({ "code": 200, "data": { "total": 0 } }));
		})
		.await;
	let (client, recorder) =
		build_reqwest_test_client(&server.url("/api"), store_with_token("tk-1"));
	let value = client
		.dispatch(RequestDescriptor::get("/user/list").json(json!({ "page": 1, "keyword": "ann" })))
		.await
		.expect("Envelope with code 200 should succeed.");

	mock.assert_async().await;

	assert_eq!(value["data"]["total"], 0);
	assert_eq!(client.pending_requests(), 0);
	assert_eq!(client.progress_count(), 0);
	assert_eq!(
		recorder.events(),
		vec![SurfaceEvent::ProgressStart, SurfaceEvent::ProgressDone],
		"Only the progress indicator should be touched."
	);
	assert_eq!(client.stats().successes(), 1);
}

#[tokio::test]
async fn unauthorized_response_forces_logout() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/user/update");
			then.status(401).json_body(json!({ "message": "token expired" }));
		})
		.await;

	let store = store_with_token("stale");
	let (client, recorder) = build_reqwest_test_client(&server.url("/api"), store.clone());
	let err = client
		.dispatch(RequestDescriptor::post("/user/update").json(json!({ "id": 1 })))
		.await
		.expect_err("A 401 response must fail.");

	assert_eq!(err.status(), Some(401));
	assert_eq!(err.kind(), ErrorKind::Transport);
	assert!(!client.session().is_logged_in());
	assert_eq!(store.get_now(TOKEN_KEY), None);
	assert_eq!(recorder.navigations(), vec!["/login".to_owned()]);
	assert_eq!(recorder.notices(), vec![(NoticeLevel::Error, LOGIN_EXPIRED_MESSAGE.to_owned())]);
}

#[tokio::test]
async fn identical_inflight_request_is_superseded() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/system/stats");
			then.status(200)
				.delay(Duration::from_millis(300))
				.json_body(json!({ "code": 200, "data": "fresh" }));
		})
		.await;

	let (client, recorder) = build_reqwest_test_client(&server.url("/api"), store_with_token("tk"));
	let (first, second) = tokio::join!(
		client.dispatch(RequestDescriptor::get("/system/stats")),
		client.dispatch(RequestDescriptor::get("/system/stats")),
	);
	let first = first.expect_err("Superseded request must be aborted.");

	assert!(first.is_aborted());
	assert!(matches!(first, Error::Aborted { ref reason } if reason == DUPLICATE_REASON));
	assert_eq!(second.expect("Latest request should succeed.")["data"], "fresh");
	assert!(recorder.notices().is_empty(), "Aborted requests must stay silent.");
	assert_eq!(client.pending_requests(), 0);
	assert_eq!(client.progress_count(), 0);
	assert_eq!(client.stats().aborted(), 1);
}

#[tokio::test]
async fn opt_out_lets_identical_requests_run_side_by_side() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/file/list");
			then.status(200)
				.delay(Duration::from_millis(100))
				.json_body(json!({ "code": 0, "data": [] }));
		})
		.await;
	let (client, _) = build_reqwest_test_client(&server.url("/api"), store_with_token("tk"));
	let parallel = || {
		RequestDescriptor::get("/file/list")
			.options(RequestOptions::default().cancel_duplicate(false))
	};
	let (first, second) = tokio::join!(client.dispatch(parallel()), client.dispatch(parallel()));

	first.expect("First request should succeed.");
	second.expect("Second request should succeed.");

	assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn business_failure_reaches_on_fail_with_warn_helper() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/products/batch-delete");
			then.status(200).json_body(json!({ "code": 4001, "message": "Product is referenced" }));
		})
		.await;

	let (client, recorder) = build_reqwest_test_client(&server.url("/api"), store_with_token("tk"));
	let fails = Arc::new(AtomicUsize::new(0));
	let seen = fails.clone();
	let options = RequestOptions::default().show_error(false).on_fail(move |failure, warn| {
		seen.fetch_add(1, Ordering::SeqCst);
		warn.show(failure.message());
	});
	let err = client
		.dispatch(
			RequestDescriptor::post("/products/batch-delete")
				.json(json!({ "ids": [1] }))
				.options(options),
		)
		.await
		.expect_err("Business failure must be reported as an error.");

	assert_eq!(err.kind(), ErrorKind::Business);
	assert_eq!(fails.load(Ordering::SeqCst), 1);
	assert_eq!(
		recorder.notices(),
		vec![(NoticeLevel::Error, "Product is referenced".to_owned())]
	);

	Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
	let (client, recorder) =
		build_reqwest_test_client("http://127.0.0.1:9/api", Arc::new(MemoryStore::default()));
	let err = client
		.dispatch(RequestDescriptor::get("/system/config"))
		.await
		.expect_err("Nothing listens on the discard port.");

	assert_eq!(err.kind(), ErrorKind::Transport);
	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(recorder.notices(), vec![(NoticeLevel::Error, NETWORK_FAILURE_MESSAGE.to_owned())]);
	assert_eq!(client.stats().transport_failures(), 1);
}
