//! Log-only UI surfaces for services, CLIs, and tests that have no toolkit attached.

// self
use crate::{
	obs,
	ui::{LoadingOverlay, LoadingSurface, LoadingTarget, Navigator, Notice, Notifier, ProgressIndicator},
};

/// Implements every UI contract by emitting log events.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessSurfaces;
impl Notifier for HeadlessSurfaces {
	fn notify(&self, notice: Notice) {
		obs::log_notice(&notice);
	}
}
impl ProgressIndicator for HeadlessSurfaces {
	fn start(&self) {
		obs::log_progress_edge("start");
	}

	fn done(&self) {
		obs::log_progress_edge("done");
	}
}
impl Navigator for HeadlessSurfaces {
	fn navigate(&self, route: &str) {
		obs::log_navigation(route);
	}
}
impl LoadingSurface for HeadlessSurfaces {
	fn acquire(&self, target: &LoadingTarget) -> Option<Box<dyn LoadingOverlay>> {
		let resolvable = match target {
			LoadingTarget::Selector(selector) => !selector.trim().is_empty(),
			LoadingTarget::Component(name) => !name.trim().is_empty(),
			LoadingTarget::Element(_) => true,
		};

		if !resolvable {
			obs::warn_unresolved_target(target);

			return None;
		}

		obs::log_loading(target, "open");

		Some(Box::new(HeadlessOverlay(target.clone())))
	}
}

struct HeadlessOverlay(LoadingTarget);
impl LoadingOverlay for HeadlessOverlay {
	fn close(self: Box<Self>) {
		obs::log_loading(&self.0, "close");
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn blank_targets_do_not_resolve() {
		let surfaces = HeadlessSurfaces;

		assert!(surfaces.acquire(&LoadingTarget::Selector("  ".into())).is_none());
		assert!(surfaces.acquire(&LoadingTarget::Component(String::new())).is_none());

		let overlay = surfaces
			.acquire(&LoadingTarget::Element(3))
			.expect("Element handles always resolve headlessly.");

		overlay.close();
	}
}
