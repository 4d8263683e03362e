// self
use crate::{
	_prelude::*,
	fingerprint::Fingerprint,
	request::Method,
	ui::{LoadingTarget, Notice},
};
#[cfg(feature = "tracing")] use crate::ui::NoticeLevel;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedDispatch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedDispatch<F> = F;

/// A span builder used around each dispatch.
#[derive(Clone, Debug)]
pub struct DispatchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl DispatchSpan {
	/// Creates a new span tagged with the request's method + path.
	pub fn new(method: Method, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"request_broker.dispatch",
				method = method.label(),
				path,
				request_id = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, path);

			Self {}
		}
	}

	/// Records the request id once the pre-dispatch stage assigned one.
	pub fn record_request_id(&self, request_id: &str) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("request_id", request_id);
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = request_id;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedDispatch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a registry transition (`register`, `cancel`, `settle`).
pub fn log_registry(action: &'static str, fingerprint: &Fingerprint) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(action, fingerprint = fingerprint.as_str(), "pending request registry");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (action, fingerprint);
	}
}

/// Logs a progress indicator edge.
pub fn log_progress_edge(edge: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(edge, "progress indicator");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = edge;
	}
}

/// Logs a loading overlay transition.
pub fn log_loading(target: &LoadingTarget, action: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(%target, action, "loading overlay");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (target, action);
	}
}

/// Warns that a loading target could not be resolved.
pub fn warn_unresolved_target(target: &LoadingTarget) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%target, "loading target not found");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = target;
	}
}

/// Logs a notice at a level matching its severity.
pub fn log_notice(notice: &Notice) {
	#[cfg(feature = "tracing")]
	{
		let message = notice.message.as_str();

		match notice.level {
			NoticeLevel::Success => tracing::info!(message, "notice"),
			NoticeLevel::Warning => tracing::warn!(message, "notice"),
			NoticeLevel::Error => tracing::error!(message, "notice"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = notice;
	}
}

/// Logs a navigation request.
pub fn log_navigation(route: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(route, "navigate");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = route;
	}
}

/// Logs a failure that could not be propagated, such as a storage error during forced logout.
pub fn log_swallowed(context: &'static str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(context, error = %error, "ignored failure");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (context, error);
	}
}
