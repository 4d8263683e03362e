//! System administration endpoints.

// self
use crate::{
	_prelude::*,
	client::Client,
	http::HttpTransport,
	request::{Method, RequestOptions},
	services::{describe, describe_with},
};

/// System administration endpoints.
#[derive(Debug)]
pub struct SystemApi<'a, T>
where
	T: HttpTransport,
{
	client: &'a Client<T>,
}
impl<'a, T> SystemApi<'a, T>
where
	T: HttpTransport,
{
	pub(crate) fn new(client: &'a Client<T>) -> Self {
		Self { client }
	}

	/// `GET /system/config`.
	pub async fn config(&self, options: RequestOptions) -> Result<Value> {
		self.client.dispatch(describe(Method::Get, "/system/config", options, None)).await
	}

	/// `PUT /system/config`.
	pub async fn update_config<P>(&self, config: &P, options: RequestOptions) -> Result<Value>
	where
		P: ?Sized + Serialize,
	{
		let descriptor = describe_with(Method::Put, "/system/config", config, options, None)?;

		self.client.dispatch(descriptor).await
	}

	/// `GET /system/stats`.
	pub async fn stats(&self, options: RequestOptions) -> Result<Value> {
		self.client.dispatch(describe(Method::Get, "/system/stats", options, None)).await
	}

	/// `POST /system/clear-cache`.
	pub async fn clear_cache(&self, options: RequestOptions) -> Result<Value> {
		self.client.dispatch(describe(Method::Post, "/system/clear-cache", options, None)).await
	}
}
