//! Typed service wrappers over [`Client::dispatch`].
//!
//! Every call accepts a [`RequestOptions`] value whose fields override the wrapper's defaults;
//! a caller-provided success message always wins over the wrapper's.

pub mod auth;
pub mod file;
pub mod product;
pub mod system;
pub mod user;

pub use auth::*;
pub use file::*;
pub use product::*;
pub use system::*;
pub use user::*;

// self
use crate::{
	_prelude::*,
	client::Client,
	http::HttpTransport,
	request::{Method, RequestDescriptor, RequestOptions},
};

impl<T> Client<T>
where
	T: HttpTransport,
{
	/// User management endpoints.
	pub fn users(&self) -> UserApi<'_, T> {
		UserApi::new(self)
	}

	/// Authentication endpoints.
	pub fn auth(&self) -> AuthApi<'_, T> {
		AuthApi::new(self)
	}

	/// Product catalog endpoints.
	pub fn products(&self) -> ProductApi<'_, T> {
		ProductApi::new(self)
	}

	/// File management endpoints.
	pub fn files(&self) -> FileApi<'_, T> {
		FileApi::new(self)
	}

	/// System administration endpoints.
	pub fn system(&self) -> SystemApi<'_, T> {
		SystemApi::new(self)
	}
}

/// Builds a descriptor, applying `success_message` unless the caller chose one.
fn describe(
	method: Method,
	path: impl Into<String>,
	options: RequestOptions,
	success_message: Option<&str>,
) -> RequestDescriptor {
	let options = match success_message {
		Some(message) => options.or_success_message(message),
		None => options,
	};

	RequestDescriptor::new(method, path).options(options)
}

/// Same as [`describe`] with a serialized payload.
fn describe_with<P>(
	method: Method,
	path: impl Into<String>,
	payload: &P,
	options: RequestOptions,
	success_message: Option<&str>,
) -> Result<RequestDescriptor>
where
	P: ?Sized + Serialize,
{
	describe(method, path, options, success_message).payload(payload)
}
