//! File management endpoints. Uploads need multipart bodies and are not offered here.

// self
use crate::{
	_prelude::*,
	client::Client,
	http::HttpTransport,
	request::{Method, RequestOptions},
	services::{describe, describe_with},
};

/// File management endpoints.
#[derive(Debug)]
pub struct FileApi<'a, T>
where
	T: HttpTransport,
{
	client: &'a Client<T>,
}
impl<'a, T> FileApi<'a, T>
where
	T: HttpTransport,
{
	pub(crate) fn new(client: &'a Client<T>) -> Self {
		Self { client }
	}

	/// `DELETE /file/{file_id}`.
	pub async fn delete(&self, file_id: &str, options: RequestOptions) -> Result<Value> {
		let descriptor =
			describe(Method::Delete, format!("/file/{}", file_id.trim_matches('/')), options, None);

		self.client.dispatch(descriptor).await
	}

	/// `GET /file/list` with arbitrary filters.
	pub async fn list<P>(&self, params: &P, options: RequestOptions) -> Result<Value>
	where
		P: ?Sized + Serialize,
	{
		let descriptor = describe_with(Method::Get, "/file/list", params, options, None)?;

		self.client.dispatch(descriptor).await
	}
}
