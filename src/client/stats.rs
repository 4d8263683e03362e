// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::DispatchEvent;

/// Thread-safe counters for dispatch outcomes.
#[derive(Debug, Default)]
pub struct DispatchStats {
	attempts: AtomicU64,
	success: AtomicU64,
	business: AtomicU64,
	transport: AtomicU64,
	aborted: AtomicU64,
	unclassified: AtomicU64,
}
impl DispatchStats {
	/// Returns the total number of dispatch attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of successful dispatches, passthrough payloads included.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of business failures.
	pub fn business_failures(&self) -> u64 {
		self.business.load(Ordering::Relaxed)
	}

	/// Returns the number of HTTP status and network failures.
	pub fn transport_failures(&self) -> u64 {
		self.transport.load(Ordering::Relaxed)
	}

	/// Returns the number of cancelled dispatches.
	pub fn aborted(&self) -> u64 {
		self.aborted.load(Ordering::Relaxed)
	}

	/// Returns the number of decode and local failures.
	pub fn unclassified(&self) -> u64 {
		self.unclassified.load(Ordering::Relaxed)
	}

	/// Returns the number of dispatches that have settled.
	pub fn settled(&self) -> u64 {
		self.successes()
			+ self.business_failures()
			+ self.transport_failures()
			+ self.aborted()
			+ self.unclassified()
	}

	pub(crate) fn record(&self, event: DispatchEvent) {
		let counter = match event {
			DispatchEvent::Attempt => &self.attempts,
			DispatchEvent::Success => &self.success,
			DispatchEvent::Business => &self.business,
			DispatchEvent::Transport => &self.transport,
			DispatchEvent::Aborted => &self.aborted,
			DispatchEvent::Unclassified => &self.unclassified,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
