//! Auth session: the process-wide bearer token and its persisted copy.

mod secret;

pub use secret::AuthToken;

// self
use crate::{_prelude::*, store::KeyValueStore};

/// Storage key under which the token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Holds the current token in memory and mirrors changes to the store.
pub struct AuthSession {
	store: Arc<dyn KeyValueStore>,
	token: RwLock<Option<AuthToken>>,
}
impl AuthSession {
	/// Loads the persisted token, if any.
	pub async fn restore(store: Arc<dyn KeyValueStore>) -> Result<Self> {
		let token = store.get(TOKEN_KEY).await?.and_then(AuthToken::new);

		Ok(Self::from_token(store, token))
	}

	/// Builds a session around an already-known token without touching the store.
	pub fn from_token(store: Arc<dyn KeyValueStore>, token: Option<AuthToken>) -> Self {
		Self { store, token: RwLock::new(token) }
	}

	/// Current token.
	pub fn token(&self) -> Option<AuthToken> {
		self.token.read().clone()
	}

	/// `Authorization` header value for the current token.
	pub fn bearer(&self) -> Option<String> {
		self.token.read().as_ref().map(AuthToken::bearer)
	}

	/// Returns `true` while a token is held.
	pub fn is_logged_in(&self) -> bool {
		self.token.read().is_some()
	}

	/// Stores a new token in memory and in the store.
	///
	/// A blank token signs the session out instead.
	pub async fn sign_in(&self, token: impl Into<String>) -> Result<()> {
		let Some(token) = AuthToken::new(token) else {
			return self.sign_out().await;
		};

		self.store.set(TOKEN_KEY, token.expose().to_owned()).await?;
		*self.token.write() = Some(token);

		Ok(())
	}

	/// Clears the in-memory token and removes the persisted copy.
	///
	/// The in-memory token is cleared even when the store fails.
	pub async fn sign_out(&self) -> Result<()> {
		self.token.write().take();
		self.store.remove(TOKEN_KEY).await?;

		Ok(())
	}

	/// Backing store.
	pub fn store(&self) -> &Arc<dyn KeyValueStore> {
		&self.store
	}
}
impl Debug for AuthSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthSession").field("token", &*self.token.read()).finish()
	}
}
