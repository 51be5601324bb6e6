//! OS keyring storage backend
//!
//! Each key is stored as its own keyring entry (Keychain on macOS, Secret
//! Service on Linux, Windows Credential Manager on Windows) under a shared
//! service name.

use crate::auth::store::StorageBackend;
use crate::error::Result;

/// Default keyring service name.
pub const DEFAULT_SERVICE: &str = "unionsite";

/// Backend storing each key in the OS native keyring.
///
/// # Examples
///
/// ```no_run
/// use unionsite::auth::store::{KeyringBackend, StorageBackend};
///
/// let backend = KeyringBackend::default();
/// backend.set("accessToken", "T1").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    service: String,
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl KeyringBackend {
    /// Creates a backend using `service` as the keyring service name.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// The keyring service name entries are filed under.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, key)?)
    }
}

impl StorageBackend for KeyringBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
