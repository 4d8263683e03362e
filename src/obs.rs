//! Observability helpers for the dispatch pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `request_broker.dispatch` with the `method`,
//!   `path`, and `request_id` fields, plus events for registry, progress, loading, and notice
//!   activity.
//! - Enable `metrics` to increment the `request_broker_dispatch_total` counter for every
//!   attempt/settlement, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, error::ErrorKind};

/// Outcome labels recorded for each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchEvent {
	/// Entry to the dispatcher.
	Attempt,
	/// Successful settlement.
	Success,
	/// Settled with a business failure.
	Business,
	/// Settled with an HTTP status or network failure.
	Transport,
	/// Cancelled before settlement.
	Aborted,
	/// Settled with an unclassified failure.
	Unclassified,
}
impl DispatchEvent {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DispatchEvent::Attempt => "attempt",
			DispatchEvent::Success => "success",
			DispatchEvent::Business => "business",
			DispatchEvent::Transport => "transport",
			DispatchEvent::Aborted => "aborted",
			DispatchEvent::Unclassified => "unclassified",
		}
	}

	/// Maps a settled result onto its label.
	pub fn settled<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => DispatchEvent::Success,
			Err(err) => err.kind().into(),
		}
	}
}
impl From<ErrorKind> for DispatchEvent {
	fn from(kind: ErrorKind) -> Self {
		match kind {
			ErrorKind::Aborted => DispatchEvent::Aborted,
			ErrorKind::Transport => DispatchEvent::Transport,
			ErrorKind::Business => DispatchEvent::Business,
			ErrorKind::Unclassified => DispatchEvent::Unclassified,
		}
	}
}
impl Display for DispatchEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
