//! JSON-file storage backend
//!
//! All keys live in a single JSON object. Every update rewrites the whole
//! file through a temporary sibling and a rename, so readers never observe a
//! half-written token pair.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;

use crate::auth::store::StorageBackend;
use crate::error::{ClientError, Result};

/// File name used inside the data directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

type Entries = BTreeMap<String, String>;

/// Backend persisting credentials to a JSON file.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileBackend {
    /// Creates a backend in the platform data directory.
    ///
    /// The `UNIONSITE_CREDENTIALS_FILE` environment variable overrides the
    /// location, which keeps tests away from the user's real session.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("UNIONSITE_CREDENTIALS_FILE") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("org", "unionsite", "unionsite")
            .ok_or_else(|| ClientError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join(CREDENTIALS_FILE))
    }

    /// Creates a backend that uses the given file.
    ///
    /// The parent directory is created if needed; the file itself is only
    /// created on the first write.
    ///
    /// # Examples
    ///
    /// ```
    /// use unionsite::auth::store::{FileBackend, StorageBackend};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let backend = FileBackend::new_with_path(dir.path().join("creds.json")).unwrap();
    /// backend.set("accessToken", "T1").unwrap();
    /// assert_eq!(backend.get("accessToken").unwrap().as_deref(), Some("T1"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ClientError::Storage(format!(
                        "Failed to create credentials directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                ClientError::Storage(format!(
                    "Corrupt credentials file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, json.as_bytes())?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Entries),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ClientError::Storage("credentials file lock poisoned".into()))?;
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

/// Writes `contents` to a freshly created file that is owner-only from the
/// moment it exists.
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;

    // A leftover from an interrupted write may carry looser permissions.
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(())
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ClientError::Storage("credentials file lock poisoned".into()))?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn set_many(&self, batch: &[(&str, &str)]) -> Result<()> {
        self.update(|entries| {
            for (key, value) in batch {
                entries.insert((*key).to_string(), (*value).to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}
