//! UI collaborator contracts: notifications, scoped loading overlays, the global progress
//! indicator, and navigation.
//!
//! The dispatcher never renders anything itself. Applications plug their toolkit in through
//! these traits; [`Surfaces::default`] wires the headless implementations, which only log.

mod headless;

pub use headless::*;

// self
use crate::_prelude::*;

/// Severity of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
	/// Positive confirmation.
	Success,
	/// Recoverable problem.
	Warning,
	/// Failure.
	Error,
}
impl NoticeLevel {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			NoticeLevel::Success => "success",
			NoticeLevel::Warning => "warning",
			NoticeLevel::Error => "error",
		}
	}
}

/// Toast-style message dispatched to the [`Notifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
	/// Severity.
	pub level: NoticeLevel,
	/// Text shown to the user.
	pub message: String,
}
impl Notice {
	/// Builds a success notice.
	pub fn success(message: impl Into<String>) -> Self {
		Self { level: NoticeLevel::Success, message: message.into() }
	}

	/// Builds a warning notice.
	pub fn warning(message: impl Into<String>) -> Self {
		Self { level: NoticeLevel::Warning, message: message.into() }
	}

	/// Builds an error notice.
	pub fn error(message: impl Into<String>) -> Self {
		Self { level: NoticeLevel::Error, message: message.into() }
	}
}

/// Toast/notification surface.
pub trait Notifier
where
	Self: Send + Sync,
{
	/// Shows a notice.
	fn notify(&self, notice: Notice);
}

/// Global progress bar. Only invoked on the idle/busy edges.
pub trait ProgressIndicator
where
	Self: Send + Sync,
{
	/// The first request started.
	fn start(&self);

	/// The last request settled.
	fn done(&self);
}

/// Router used for forced redirects.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates to an application route.
	fn navigate(&self, route: &str);
}

/// Resolves loading targets and opens overlays on them.
pub trait LoadingSurface
where
	Self: Send + Sync,
{
	/// Opens an overlay on `target`, or returns `None` when the target cannot be resolved.
	fn acquire(&self, target: &LoadingTarget) -> Option<Box<dyn LoadingOverlay>>;
}

/// A dismissible loading overlay.
pub trait LoadingOverlay
where
	Self: Send + Sync,
{
	/// Removes the overlay. Consumes the handle so it cannot be closed twice.
	fn close(self: Box<Self>);
}

/// UI region a scoped loading overlay is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingTarget {
	/// CSS-style selector.
	Selector(String),
	/// Named component instance.
	Component(String),
	/// Opaque element handle issued by the UI toolkit.
	Element(u64),
}
impl Display for LoadingTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Selector(selector) => write!(f, "selector:{selector}"),
			Self::Component(name) => write!(f, "component:{name}"),
			Self::Element(handle) => write!(f, "element:{handle}"),
		}
	}
}

/// The full set of UI collaborators a client talks to.
#[derive(Clone)]
pub struct Surfaces {
	/// Toast surface.
	pub notifier: Arc<dyn Notifier>,
	/// Scoped loading surface.
	pub loading: Arc<dyn LoadingSurface>,
	/// Global progress indicator.
	pub progress: Arc<dyn ProgressIndicator>,
	/// Router.
	pub navigator: Arc<dyn Navigator>,
}
impl Default for Surfaces {
	fn default() -> Self {
		let headless = Arc::new(HeadlessSurfaces);

		Self {
			notifier: headless.clone(),
			loading: headless.clone(),
			progress: headless.clone(),
			navigator: headless,
		}
	}
}
impl Debug for Surfaces {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Surfaces(..)")
	}
}

/// Deferred notifier handed to business-failure callbacks.
///
/// The callback decides whether and what to show; the helper stays silent when the request
/// disabled error text.
#[derive(Clone)]
pub struct ShowWarn {
	notifier: Option<Arc<dyn Notifier>>,
}
impl ShowWarn {
	pub(crate) fn new(notifier: Arc<dyn Notifier>, enabled: bool) -> Self {
		Self { notifier: enabled.then_some(notifier) }
	}

	/// Shows `message` as an error notice. Empty messages are ignored.
	pub fn show(&self, message: &str) {
		if message.is_empty() {
			return;
		}
		if let Some(notifier) = &self.notifier {
			notifier.notify(Notice::error(message));
		}
	}

	/// Returns `true` when [`show`](Self::show) would reach the notifier.
	pub fn is_enabled(&self) -> bool {
		self.notifier.is_some()
	}
}
impl Debug for ShowWarn {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ShowWarn").field("enabled", &self.is_enabled()).finish()
	}
}
