//! Product catalog endpoints.

// self
use crate::{
	_prelude::*,
	client::Client,
	http::HttpTransport,
	request::{Method, RequestOptions},
	services::{BatchDeleteParams, describe, describe_with},
};

/// Catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
	/// Product id.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Unit price.
	pub price: f64,
	/// Category name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// Long description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Fields this crate does not model.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// Filters for [`ProductApi::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListParams {
	/// 1-based page number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Page size.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size: Option<u32>,
	/// Category filter.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
}

/// Product catalog endpoints.
#[derive(Debug)]
pub struct ProductApi<'a, T>
where
	T: HttpTransport,
{
	client: &'a Client<T>,
}
impl<'a, T> ProductApi<'a, T>
where
	T: HttpTransport,
{
	pub(crate) fn new(client: &'a Client<T>) -> Self {
		Self { client }
	}

	/// `GET /products`. The page shape varies by deployment, so it is returned as JSON.
	pub async fn list(&self, params: &ProductListParams, options: RequestOptions) -> Result<Value> {
		let descriptor = describe_with(Method::Get, "/products", params, options, None)?;

		self.client.dispatch(descriptor).await
	}

	/// `GET /products/{id}`.
	pub async fn detail(&self, id: u64, options: RequestOptions) -> Result<Product> {
		self.client.dispatch_as(describe(Method::Get, format!("/products/{id}"), options, None)).await
	}

	/// `POST /products`.
	pub async fn create<P>(&self, product: &P, options: RequestOptions) -> Result<Value>
	where
		P: ?Sized + Serialize,
	{
		let descriptor = describe_with(Method::Post, "/products", product, options, None)?;

		self.client.dispatch(descriptor).await
	}

	/// `PUT /products/{id}` with a partial product.
	pub async fn update<P>(&self, id: u64, changes: &P, options: RequestOptions) -> Result<Value>
	where
		P: ?Sized + Serialize,
	{
		let descriptor =
			describe_with(Method::Put, format!("/products/{id}"), changes, options, None)?;

		self.client.dispatch(descriptor).await
	}

	/// `DELETE /products/{id}`.
	pub async fn delete(&self, id: u64, options: RequestOptions) -> Result<Value> {
		self.client.dispatch(describe(Method::Delete, format!("/products/{id}"), options, None)).await
	}

	/// `POST /products/batch-delete`.
	pub async fn batch_delete(&self, ids: &[u64], options: RequestOptions) -> Result<Value> {
		let descriptor = describe_with(
			Method::Post,
			"/products/batch-delete",
			&BatchDeleteParams { ids: ids.to_vec() },
			options,
			None,
		)?;

		self.client.dispatch(descriptor).await
	}

	/// `GET /products/categories`.
	pub async fn categories(&self, options: RequestOptions) -> Result<Value> {
		self.client.dispatch(describe(Method::Get, "/products/categories", options, None)).await
	}
}
