#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use request_broker::{
	_preludet::*,
	request::RequestOptions,
	services::{LoginParams, ProductListParams, UserListParams},
	store::MemoryStore,
	ui::NoticeLevel,
};

#[tokio::test]
async fn login_then_sign_in_authorizes_later_calls() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/login")
				.json_body(json!({ "username": "admin", "password": "hunter2" }));
			then.status(200).json_body(json!({
				"code": 200,
				"data": {
					"token": "issued",
					"userInfo": {
						"id": 1,
						"username": "admin",
						"email": "admin@example.com",
						"status": 1,
						"createTime": "2024-01-01 08:00:00",
						"updateTime": "2024-01-01 08:00:00"
					}
				}
			}));
		})
		.await;
	let info = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/info").header("authorization", "Bearer issued");
			then.status(200).json_body(json!({
				"code": 200,
				"data": {
					"id": 1,
					"username": "admin",
					"email": "admin@example.com",
					"avatar": "https://cdn.example.com/a.png",
					"status": 1,
					"createTime": "2024-01-01 08:00:00",
					"updateTime": "2024-01-03 08:00:00"
				}
			}));
		})
		.await;
	let store = Arc::new(MemoryStore::default());
	let (client, recorder) = build_reqwest_test_client(&server.url("/api"), store.clone());
	let params = LoginParams { username: "admin".into(), password: "hunter2".into(), captcha: None };
	let response = client.auth().login(&params, RequestOptions::default()).await?;

	client.sign_in(response.token).await?;

	let profile = client.users().info(RequestOptions::default()).await?;

	login.assert_async().await;
	info.assert_async().await;

	assert_eq!(profile.avatar.as_deref(), Some("https://cdn.example.com/a.png"));
	assert_eq!(store.get_now("token").as_deref(), Some("issued"));
	assert_eq!(recorder.notices(), vec![(NoticeLevel::Success, "Login successful.".to_owned())]);

	Ok(())
}

#[tokio::test]
async fn list_endpoints_encode_filters_in_query() {
	let server = MockServer::start_async().await;
	let users = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/user/list")
				.query_param("page", "3")
				.query_param("keyword", "li")
				.query_param_missing("status");
			then.status(200).json_body(json!({
				"code": 200,
				"data": { "list": [], "total": 0, "page": 3, "pageSize": 20 }
			}));
		})
		.await;
	let products = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/products").query_param("category", "books");
			then.status(200).json_body(json!({ "code": 200, "data": { "items": [] } }));
		})
		.await;
	let (client, _) = build_reqwest_test_client(&server.url("/api"), store_with_token("tk"));
	let page = client
		.users()
		.list(
			&UserListParams { page: Some(3), keyword: Some("li".into()), ..Default::default() },
			RequestOptions::default(),
		)
		.await
		.expect("User list should decode.");

	assert_eq!(page.page_size, 20);

	client
		.products()
		.list(
			&ProductListParams { category: Some("books".into()), ..Default::default() },
			RequestOptions::default(),
		)
		.await
		.expect("Product list should succeed.");

	users.assert_async().await;
	products.assert_async().await;
}

#[tokio::test]
async fn write_endpoints_use_their_methods_and_paths() {
	let server = MockServer::start_async().await;
	let update = server
		.mock_async(|when, then| {
			when.method(PUT).path("/api/products/12").json_body(json!({ "price": 9.5 }));
			then.status(200).json_body(json!({ "code": 200 }));
		})
		.await;
	let remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/file/abc-1");
			then.status(200).json_body(json!({ "code": 200 }));
		})
		.await;
	let clear = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/system/clear-cache");
			then.status(200).json_body(json!({ "code": 200, "success": true }));
		})
		.await;
	let (client, recorder) = build_reqwest_test_client(&server.url("/api"), store_with_token("tk"));

	client
		.products()
		.update(12, &json!({ "price": 9.5 }), RequestOptions::default())
		.await
		.expect("Product update should succeed.");
	client.files().delete("abc-1", RequestOptions::default()).await.expect("File delete should succeed.");
	client
		.system()
		.clear_cache(RequestOptions::default().success_message("Cache cleared."))
		.await
		.expect("Cache clear should succeed.");

	update.assert_async().await;
	remove.assert_async().await;
	clear.assert_async().await;

	assert_eq!(recorder.notices(), vec![(NoticeLevel::Success, "Cache cleared.".to_owned())]);
}
