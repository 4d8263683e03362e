//! Pending-request registry: one cancellation handle per in-flight fingerprint.
//!
//! Registering a fingerprint that is already in flight cancels the earlier request before the
//! new handle is stored, unless the path is exempt through [`AllowDuplicateRules`] or the
//! caller opted out. Check, cancel, and insert happen under one lock, so concurrent callers
//! observe a single winner.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use regex::Regex;
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::ConfigError, fingerprint::Fingerprint, obs};

/// Reason recorded when a newer identical request supersedes an older one.
pub const DUPLICATE_REASON: &str = "duplicate request cancelled";
/// Reason used when no reason was recorded.
pub const DEFAULT_REASON: &str = "request cancelled";

/// Receiving side of a cancellation handle, attached to the outgoing transport call.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
	token: CancellationToken,
	reason: Arc<Mutex<Option<String>>>,
}
impl CancelSignal {
	/// Returns `true` once the request was cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Returns the recorded cancellation reason, if any.
	pub fn reason(&self) -> Option<String> {
		self.reason.lock().clone()
	}

	/// Resolves once the request is cancelled.
	pub async fn cancelled(&self) {
		self.token.cancelled().await
	}

	/// Drives `fut` to completion unless the signal fires first, in which case `fut` is dropped
	/// and `None` is returned.
	pub async fn run_until_cancelled<F>(&self, fut: F) -> Option<F::Output>
	where
		F: Future,
	{
		self.token.run_until_cancelled(fut).await
	}

	fn trigger(&self, reason: &str) {
		{
			let mut slot = self.reason.lock();

			if slot.is_none() {
				*slot = Some(reason.to_owned());
			}
		}

		self.token.cancel();
	}
}

/// Triggering side of a registry entry.
#[derive(Clone, Debug)]
pub struct CancelHandle {
	id: u64,
	signal: CancelSignal,
}
impl CancelHandle {
	/// Unique id of the registry entry this handle belongs to.
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Returns a clone of the receiving side.
	pub fn signal(&self) -> CancelSignal {
		self.signal.clone()
	}

	/// Cancels the request. The first recorded reason wins.
	pub fn cancel(&self, reason: &str) {
		self.signal.trigger(reason);
	}

	/// Returns `true` once the request was cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.signal.is_cancelled()
	}
}

/// Result of [`PendingRegistry::register`].
#[derive(Debug)]
pub struct Registration {
	/// Handle for the newly registered request.
	pub handle: CancelHandle,
	/// Entry the new one replaced, already cancelled unless duplicates were allowed.
	pub displaced: Option<CancelHandle>,
}

/// Paths exempt from duplicate cancellation.
///
/// Rules without `*` match the request path exactly; `*` matches any run of characters and the
/// rest of the rule is literal.
#[derive(Clone, Debug, Default)]
pub struct AllowDuplicateRules {
	exact: Vec<String>,
	patterns: Vec<Regex>,
}
impl AllowDuplicateRules {
	/// Compiles the provided rules.
	pub fn new<I, S>(rules: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut compiled = Self::default();

		for rule in rules {
			let rule = rule.as_ref().trim();

			if rule.is_empty() {
				continue;
			}
			if !rule.contains('*') {
				compiled.exact.push(rule.to_owned());

				continue;
			}

			let pattern = format!(
				"^{}$",
				rule.split('*').map(regex::escape).collect::<Vec<_>>().join(".*")
			);
			let regex = Regex::new(&pattern)
				.map_err(|source| ConfigError::InvalidPattern { pattern: rule.to_owned(), source })?;

			compiled.patterns.push(regex);
		}

		Ok(compiled)
	}

	/// Returns `true` when `path` may run concurrently with identical requests.
	pub fn matches(&self, path: &str) -> bool {
		self.exact.iter().any(|rule| rule == path)
			|| self.patterns.iter().any(|pattern| pattern.is_match(path))
	}

	/// Returns `true` when no rules are configured.
	pub fn is_empty(&self) -> bool {
		self.exact.is_empty() && self.patterns.is_empty()
	}
}

/// Map from fingerprint to the cancellation handle of the request currently in flight.
#[derive(Debug, Default)]
pub struct PendingRegistry {
	entries: Mutex<HashMap<Fingerprint, CancelHandle>>,
	next_id: AtomicU64,
}
impl PendingRegistry {
	/// Stores a fresh handle for `fingerprint`.
	///
	/// An existing entry is cancelled with [`DUPLICATE_REASON`] first, unless `allow_duplicate`
	/// is set, and is returned as [`Registration::displaced`] either way.
	pub fn register(&self, fingerprint: &Fingerprint, allow_duplicate: bool) -> Registration {
		let handle = CancelHandle {
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			signal: CancelSignal::default(),
		};
		let mut entries = self.entries.lock();
		let displaced = entries.insert(fingerprint.clone(), handle.clone());

		if let Some(prior) = displaced.as_ref().filter(|_| !allow_duplicate) {
			prior.cancel(DUPLICATE_REASON);
			obs::log_registry("cancel", fingerprint);
		}

		obs::log_registry("register", fingerprint);

		Registration { handle, displaced }
	}

	/// Cancels the entry for `fingerprint`, if any. Returns whether an entry was found.
	pub fn cancel_prior(&self, fingerprint: &Fingerprint, reason: &str) -> bool {
		let entries = self.entries.lock();

		match entries.get(fingerprint) {
			Some(handle) => {
				handle.cancel(reason);
				obs::log_registry("cancel", fingerprint);

				true
			},
			None => false,
		}
	}

	/// Removes the entry registered under `id`.
	///
	/// Entries already replaced by a newer request are left alone so the newer request stays
	/// cancellable. Returns whether an entry was removed.
	pub fn settle(&self, fingerprint: &Fingerprint, id: u64) -> bool {
		let mut entries = self.entries.lock();

		if entries.get(fingerprint).is_some_and(|handle| handle.id == id) {
			entries.remove(fingerprint);
			obs::log_registry("settle", fingerprint);

			return true;
		}

		false
	}

	/// Cancels and removes every entry. Returns how many were cancelled.
	pub fn cancel_all(&self, reason: &str) -> usize {
		let drained = self.entries.lock().drain().collect::<Vec<_>>();

		for (fingerprint, handle) in &drained {
			handle.cancel(reason);
			obs::log_registry("cancel", fingerprint);
		}

		drained.len()
	}

	/// Returns `true` when a request with `fingerprint` is in flight.
	pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
		self.entries.lock().contains_key(fingerprint)
	}

	/// Number of in-flight entries.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when nothing is in flight.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}
}
