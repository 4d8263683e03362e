//! Caller-facing request descriptors and their declarative options.

// self
use crate::{
	_prelude::*,
	envelope::BusinessFailure,
	error::DecodeError,
	ui::{LoadingTarget, ShowWarn},
};

/// Invoked with the resolved payload after a successful dispatch.
pub type SuccessCallback = Box<dyn FnOnce(&Value) + Send + Sync>;
/// Invoked with transport and unclassified failures.
pub type ErrorCallback = Box<dyn FnOnce(&Error) + Send + Sync>;
/// Invoked with business failures and a helper that may surface a warning.
pub type FailCallback = Box<dyn FnOnce(&BusinessFailure, ShowWarn) + Send + Sync>;

/// HTTP methods supported by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`; the payload travels as query parameters.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `DELETE`.
	Delete,
	/// `PATCH`.
	Patch,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
			Method::Patch => "PATCH",
		}
	}

	/// Lower-case label used in fingerprints and metric fields.
	pub const fn label(self) -> &'static str {
		match self {
			Method::Get => "get",
			Method::Post => "post",
			Method::Put => "put",
			Method::Delete => "delete",
			Method::Patch => "patch",
		}
	}

	/// Returns `true` when the payload is sent as query parameters.
	pub const fn is_read(self) -> bool {
		matches!(self, Method::Get)
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Method {
	type Err = UnknownMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(Method::Get),
			"POST" => Ok(Method::Post),
			"PUT" => Ok(Method::Put),
			"DELETE" => Ok(Method::Delete),
			"PATCH" => Ok(Method::Patch),
			_ => Err(UnknownMethod(s.to_owned())),
		}
	}
}

/// Error returned when parsing an unsupported HTTP verb.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("HTTP method `{0}` is not supported.")]
pub struct UnknownMethod(pub String);

/// Declarative options attached to a request.
pub struct RequestOptions {
	/// Notification shown after a successful dispatch.
	pub success_message: Option<String>,
	/// Region that shows a scoped loading overlay while the request is in flight.
	pub loading: Option<LoadingTarget>,
	/// Whether failures raise an error notification.
	pub show_error: bool,
	/// Whether the [`ShowWarn`] helper handed to `on_fail` surfaces messages.
	pub show_err_text: bool,
	/// Whether the request drives the global progress indicator.
	pub show_progress: bool,
	/// Whether an identical in-flight request is cancelled when this one starts.
	pub cancel_duplicate: bool,
	/// Success callback.
	pub on_success: Option<SuccessCallback>,
	/// Transport/unclassified failure callback.
	pub on_error: Option<ErrorCallback>,
	/// Business failure callback.
	pub on_fail: Option<FailCallback>,
}
impl RequestOptions {
	/// Sets the success notification text.
	pub fn success_message(mut self, message: impl Into<String>) -> Self {
		self.success_message = Some(message.into());

		self
	}

	/// Shows a scoped loading overlay on `target` while in flight.
	pub fn loading(mut self, target: LoadingTarget) -> Self {
		self.loading = Some(target);

		self
	}

	/// Toggles error notifications.
	pub fn show_error(mut self, show: bool) -> Self {
		self.show_error = show;

		self
	}

	/// Toggles the [`ShowWarn`] helper.
	pub fn show_err_text(mut self, show: bool) -> Self {
		self.show_err_text = show;

		self
	}

	/// Toggles the global progress indicator.
	pub fn show_progress(mut self, show: bool) -> Self {
		self.show_progress = show;

		self
	}

	/// Toggles duplicate cancellation.
	pub fn cancel_duplicate(mut self, cancel: bool) -> Self {
		self.cancel_duplicate = cancel;

		self
	}

	/// Registers the success callback.
	pub fn on_success(mut self, callback: impl 'static + FnOnce(&Value) + Send + Sync) -> Self {
		self.on_success = Some(Box::new(callback));

		self
	}

	/// Registers the transport/unclassified failure callback.
	pub fn on_error(mut self, callback: impl 'static + FnOnce(&Error) + Send + Sync) -> Self {
		self.on_error = Some(Box::new(callback));

		self
	}

	/// Registers the business failure callback.
	pub fn on_fail(
		mut self,
		callback: impl 'static + FnOnce(&BusinessFailure, ShowWarn) + Send + Sync,
	) -> Self {
		self.on_fail = Some(Box::new(callback));

		self
	}

	/// Applies `message` only when the caller did not choose one.
	pub fn or_success_message(mut self, message: &str) -> Self {
		self.success_message.get_or_insert_with(|| message.to_owned());

		self
	}

	pub(crate) fn take_callbacks(&mut self) -> Callbacks {
		Callbacks {
			on_success: self.on_success.take(),
			on_error: self.on_error.take(),
			on_fail: self.on_fail.take(),
		}
	}
}
impl Default for RequestOptions {
	fn default() -> Self {
		Self {
			success_message: None,
			loading: None,
			show_error: true,
			show_err_text: true,
			show_progress: true,
			cancel_duplicate: true,
			on_success: None,
			on_error: None,
			on_fail: None,
		}
	}
}
impl Debug for RequestOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestOptions")
			.field("success_message", &self.success_message)
			.field("loading", &self.loading)
			.field("show_error", &self.show_error)
			.field("show_err_text", &self.show_err_text)
			.field("show_progress", &self.show_progress)
			.field("cancel_duplicate", &self.cancel_duplicate)
			.field("on_success_set", &self.on_success.is_some())
			.field("on_error_set", &self.on_error.is_some())
			.field("on_fail_set", &self.on_fail.is_some())
			.finish()
	}
}

pub(crate) struct Callbacks {
	pub(crate) on_success: Option<SuccessCallback>,
	pub(crate) on_error: Option<ErrorCallback>,
	pub(crate) on_fail: Option<FailCallback>,
}

/// A single logical request: target path, method, payload, and options.
///
/// Dispatch consumes the descriptor, so nothing can change it once the request starts.
#[derive(Debug)]
pub struct RequestDescriptor {
	/// Path relative to the configured base URL.
	pub path: String,
	/// HTTP method.
	pub method: Method,
	/// JSON payload; routed to the query string for `GET`, to the body otherwise.
	pub payload: Option<Value>,
	/// Declarative options.
	pub options: RequestOptions,
}
impl RequestDescriptor {
	/// Creates a descriptor with default options and no payload.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { path: path.into(), method, payload: None, options: RequestOptions::default() }
	}

	/// Shorthand for a `GET` descriptor.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` descriptor.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` descriptor.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `DELETE` descriptor.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Shorthand for a `PATCH` descriptor.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// Attaches a raw JSON payload. `null` is treated as no payload.
	pub fn json(mut self, payload: Value) -> Self {
		self.payload = Some(payload).filter(|value| !value.is_null());

		self
	}

	/// Serializes and attaches a typed payload.
	pub fn payload<P>(self, payload: &P) -> Result<Self>
	where
		P: ?Sized + Serialize,
	{
		let value = serde_json::to_value(payload).map_err(DecodeError::Payload)?;

		Ok(self.json(value))
	}

	/// Replaces the options bag.
	pub fn options(mut self, options: RequestOptions) -> Self {
		self.options = options;

		self
	}

	/// Edits the options bag in place.
	pub fn configure(mut self, f: impl FnOnce(RequestOptions) -> RequestOptions) -> Self {
		self.options = f(self.options);

		self
	}
}
