//! Global progress indicator and scoped loading overlays.
//!
//! The indicator starts when the in-flight count leaves zero and finishes when it returns to
//! zero. Each participating request holds a [`ProgressTicket`]; each scoped overlay is owned by
//! a [`LoadingGuard`]. Both release exactly once, on explicit finish or on drop.

// self
use crate::{
	_prelude::*,
	obs,
	ui::{LoadingOverlay, LoadingSurface, LoadingTarget, ProgressIndicator},
};

/// Reference-counts requests that drive the global progress indicator.
pub struct ProgressCoordinator {
	count: Mutex<usize>,
	indicator: Arc<dyn ProgressIndicator>,
}
impl ProgressCoordinator {
	/// Creates a coordinator bound to `indicator`.
	pub fn new(indicator: Arc<dyn ProgressIndicator>) -> Self {
		Self { count: Mutex::new(0), indicator }
	}

	/// Counts a request in and starts the indicator on the idle-to-busy edge.
	pub fn start(self: &Arc<Self>) -> ProgressTicket {
		{
			let mut count = self.count.lock();

			*count += 1;

			if *count == 1 {
				self.indicator.start();
			}

			obs::record_in_flight(*count);
		}

		ProgressTicket { coordinator: Some(self.clone()) }
	}

	/// Counts a request out and finishes the indicator on the busy-to-idle edge.
	///
	/// Extra calls at zero are ignored.
	pub fn done(&self) {
		let mut count = self.count.lock();

		if *count == 0 {
			return;
		}

		*count -= 1;

		if *count == 0 {
			self.indicator.done();
		}

		obs::record_in_flight(*count);
	}

	/// Number of requests currently counted in.
	pub fn count(&self) -> usize {
		*self.count.lock()
	}
}
impl Debug for ProgressCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProgressCoordinator").field("count", &self.count()).finish()
	}
}

/// One request's share of the progress indicator.
#[derive(Debug)]
pub struct ProgressTicket {
	coordinator: Option<Arc<ProgressCoordinator>>,
}
impl ProgressTicket {
	/// Counts the request out. Later calls and the eventual drop are no-ops.
	pub fn finish(&mut self) {
		if let Some(coordinator) = self.coordinator.take() {
			coordinator.done();
		}
	}

	/// Returns `true` once the ticket was finished.
	pub fn is_finished(&self) -> bool {
		self.coordinator.is_none()
	}
}
impl Drop for ProgressTicket {
	fn drop(&mut self) {
		self.finish();
	}
}

/// Scoped loading overlay bound to one request.
pub struct LoadingGuard {
	target: LoadingTarget,
	overlay: Option<Box<dyn LoadingOverlay>>,
}
impl LoadingGuard {
	/// Opens an overlay on `target`.
	///
	/// Returns `None` and logs a warning when the surface cannot resolve the target; the request
	/// proceeds without an overlay.
	pub fn acquire(surface: &dyn LoadingSurface, target: &LoadingTarget) -> Option<Self> {
		match surface.acquire(target) {
			Some(overlay) => Some(Self { target: target.clone(), overlay: Some(overlay) }),
			None => {
				obs::warn_unresolved_target(target);

				None
			},
		}
	}

	/// Target the overlay is bound to.
	pub fn target(&self) -> &LoadingTarget {
		&self.target
	}

	/// Closes the overlay. Later calls and the eventual drop are no-ops.
	pub fn release(&mut self) {
		if let Some(overlay) = self.overlay.take() {
			overlay.close();
		}
	}
}
impl Drop for LoadingGuard {
	fn drop(&mut self) {
		self.release();
	}
}
impl Debug for LoadingGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoadingGuard")
			.field("target", &self.target)
			.field("open", &self.overlay.is_some())
			.finish()
	}
}
