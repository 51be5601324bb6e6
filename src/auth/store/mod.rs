//! Credential persistence
//!
//! Session credentials are kept under three independent keys, mirroring the
//! browser storage layout the API was designed around:
//!
//! - `accessToken`  -- the bearer token attached to every request
//! - `refreshToken` -- the token exchanged for a new pair on expiry
//! - `user`         -- the cached profile, serialized as JSON
//!
//! [`CredentialStore`] provides typed access on top of any
//! [`StorageBackend`]. Three backends are provided:
//!
//! - [`file::FileBackend`]       -- JSON file in the platform data directory
//! - [`keychain::KeyringBackend`] -- one OS keyring entry per key
//! - [`memory::MemoryBackend`]   -- in-process map (tests, ephemeral sessions)

pub mod file;
pub mod keychain;
pub mod memory;

use std::sync::Arc;

use crate::auth::types::{LoginSession, TokenPair, User};
use crate::error::Result;

pub use file::FileBackend;
pub use keychain::KeyringBackend;
pub use memory::MemoryBackend;

/// Storage key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key holding the cached user profile.
pub const USER_KEY: &str = "user";

/// Every key owned by the credential store.
pub const ALL_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Durable string key/value storage.
///
/// Backends are synchronous: every operation is a short local read or write
/// and is called from code that must not yield between observing and
/// updating session state.
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Reads the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Stores several entries as one update.
    ///
    /// The default writes them one at a time; backends that can commit a
    /// batch in a single write override it.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Removes several keys as one update.
    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Typed accessor for the session credentials.
///
/// Cloning is cheap; clones share the same backend.
///
/// # Examples
///
/// ```
/// use unionsite::auth::store::CredentialStore;
/// use unionsite::auth::types::TokenPair;
///
/// # fn main() -> unionsite::Result<()> {
/// let store = CredentialStore::in_memory();
/// assert!(!store.has_credentials()?);
///
/// store.save_tokens(&TokenPair::new("T1", "R1"))?;
/// assert_eq!(store.access_token()?.as_deref(), Some("T1"));
///
/// store.clear()?;
/// assert!(store.refresh_token()?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CredentialStore {
    backend: Arc<dyn StorageBackend>,
}

impl CredentialStore {
    /// Wraps an existing backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Creates a store backed by a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Returns the stored access token, if any.
    pub fn access_token(&self) -> Result<Option<String>> {
        self.non_empty(ACCESS_TOKEN_KEY)
    }

    /// Returns the stored refresh token, if any.
    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.non_empty(REFRESH_TOKEN_KEY)
    }

    /// Returns the cached user profile, if any.
    pub fn user(&self) -> Result<Option<User>> {
        match self.non_empty(USER_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Returns `true` when any of the three keys holds a value.
    pub fn has_credentials(&self) -> Result<bool> {
        for key in ALL_KEYS {
            if self.non_empty(key)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Replaces both tokens in a single backend update.
    pub fn save_tokens(&self, tokens: &TokenPair) -> Result<()> {
        self.backend.set_many(&[
            (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
        ])
    }

    /// Stores the tokens and (when present) the profile from a login.
    pub fn save_session(&self, session: &LoginSession) -> Result<()> {
        match &session.user {
            Some(user) => {
                let user_json = serde_json::to_string(user)?;
                self.backend.set_many(&[
                    (ACCESS_TOKEN_KEY, session.access_token.as_str()),
                    (REFRESH_TOKEN_KEY, session.refresh_token.as_str()),
                    (USER_KEY, user_json.as_str()),
                ])
            }
            None => self.save_tokens(&session.tokens()),
        }
    }

    /// Replaces the cached user profile.
    pub fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.backend.set(USER_KEY, &json)
    }

    /// Removes all three keys together.
    pub fn clear(&self) -> Result<()> {
        self.backend.remove_many(&ALL_KEYS)
    }

    fn non_empty(&self, key: &str) -> Result<Option<String>> {
        Ok(self.backend.get(key)?.filter(|v| !v.is_empty()))
    }
}
