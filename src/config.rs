//! Client configuration: base URL, timeout, login route, timezone label, and duplicate rules.

// crates.io
use time::UtcOffset;
// self
use crate::{_prelude::*, error::ConfigError, registry::AllowDuplicateRules};

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Base URL every request path is resolved against. Its path always ends with `/`.
	pub base_url: Url,
	/// Transport timeout.
	pub timeout: Duration,
	/// Application route visited on forced logout.
	pub login_route: String,
	/// Value of the `X-Timezone` header.
	pub timezone: String,
	/// Paths exempt from duplicate cancellation.
	pub allow_duplicate: AllowDuplicateRules,
}
impl ClientConfig {
	/// Default transport timeout.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
	/// Default login route.
	pub const DEFAULT_LOGIN_ROUTE: &'static str = "/login";

	/// Creates a builder with defaults for every optional field.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Reads `API_BASE_URL`, `API_TIMEOUT_MS`, `API_LOGIN_ROUTE`, and `TZ` from the process
	/// environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Same as [`from_env`](Self::from_env) with a custom variable source.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let mut builder = Self::builder();

		if let Some(raw) = read("API_BASE_URL") {
			let url = Url::parse(raw.trim())
				.map_err(|source| ConfigError::UnparsableBaseUrl { source })?;

			builder = builder.base_url(url);
		}
		if let Some(raw) = read("API_TIMEOUT_MS") {
			let millis = raw
				.trim()
				.parse::<u64>()
				.map_err(|_| ConfigError::InvalidEnv { name: "API_TIMEOUT_MS", value: raw.clone() })?;

			builder = builder.timeout(Duration::from_millis(millis));
		}
		if let Some(route) = read("API_LOGIN_ROUTE") {
			builder = builder.login_route(route.trim());
		}
		if let Some(tz) = read("TZ") {
			builder = builder.timezone(tz.trim());
		}

		builder.build()
	}

	/// Resolves a request path against the base URL.
	///
	/// Leading slashes are ignored, so `/user/info` and `user/info` both land under the base
	/// path.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		let relative = path.trim().trim_start_matches('/');

		self.base_url
			.join(relative)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	base_url: Option<Url>,
	timeout: Option<Duration>,
	login_route: Option<String>,
	timezone: Option<String>,
	allow_duplicate: Vec<String>,
}
impl ClientConfigBuilder {
	/// Sets the base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Overrides the transport timeout (defaults to 10 seconds).
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the login route (defaults to `/login`).
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = Some(route.into());

		self
	}

	/// Overrides the timezone label (defaults to the local UTC offset).
	pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
		self.timezone = Some(timezone.into());

		self
	}

	/// Adds a path rule exempt from duplicate cancellation. `*` matches any run of characters.
	pub fn allow_duplicate(mut self, rule: impl Into<String>) -> Self {
		self.allow_duplicate.push(rule.into());

		self
	}

	/// Consumes the builder and validates the configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let mut base_url = self.base_url.ok_or(ConfigError::MissingBaseUrl)?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::InvalidBaseUrl { url: base_url.to_string() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		base_url.set_query(None);
		base_url.set_fragment(None);

		let timeout = self.timeout.unwrap_or(ClientConfig::DEFAULT_TIMEOUT);

		if timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		let login_route =
			self.login_route.unwrap_or_else(|| ClientConfig::DEFAULT_LOGIN_ROUTE.to_owned());

		if !login_route.starts_with('/') {
			return Err(ConfigError::InvalidLoginRoute { route: login_route });
		}

		let timezone = self
			.timezone
			.map(|tz| tz.trim().to_owned())
			.filter(|tz| !tz.is_empty())
			.unwrap_or_else(local_timezone_label);
		let allow_duplicate = AllowDuplicateRules::new(&self.allow_duplicate)?;

		Ok(ClientConfig { base_url, timeout, login_route, timezone, allow_duplicate })
	}
}

/// Describes the local UTC offset as `UTC+08:00`, or `UTC` when it cannot be determined.
pub fn local_timezone_label() -> String {
	UtcOffset::current_local_offset().map(offset_label).unwrap_or_else(|_| "UTC".into())
}

fn offset_label(offset: UtcOffset) -> String {
	let seconds = offset.whole_seconds();

	if seconds == 0 {
		return "UTC".into();
	}

	let sign = if seconds < 0 { '-' } else { '+' };
	let seconds = seconds.unsigned_abs();

	format!("UTC{sign}{:02}:{:02}", seconds / 3600, seconds % 3600 / 60)
}
