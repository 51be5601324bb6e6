//! In-process storage backend

use std::collections::HashMap;
use std::sync::RwLock;

use crate::auth::store::StorageBackend;
use crate::error::{ClientError, Result};

/// Volatile backend holding values in a map.
///
/// Used by tests and by sessions that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    fn poisoned() -> ClientError {
        ClientError::Storage("memory backend lock poisoned".to_string())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, batch: &[(&str, &str)]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        for (key, value) in batch {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
