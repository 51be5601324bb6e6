//! Configuration management for unionsite
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::auth::session::DEFAULT_LOGIN_ROUTE;
use crate::auth::store::{CredentialStore, FileBackend, KeyringBackend, MemoryBackend};
use crate::error::{ClientError, Result};
use crate::http::locale::DEFAULT_LOCALE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Longest per-request timeout accepted, in seconds
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Storage backends understood by [`StorageConfig::open_store`]
const STORAGE_BACKENDS: [&str; 3] = ["file", "keyring", "memory"];

/// Main configuration structure for unionsite
///
/// Holds the API endpoint, credential storage, and session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Credential storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session behaviour settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds); applies to the initial request, the
    /// refresh call, and each replay independently
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Language sent in `Accept-Language` when none is selected
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            default_locale: default_locale(),
        }
    }
}

/// Credential storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind: `file`, `keyring`, or `memory`
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Credentials file for the `file` backend; defaults to the platform
    /// data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_backend() -> String {
    "file".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}

impl StorageConfig {
    /// Open a credential store for the configured backend
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an unknown backend and storage
    /// errors if the file backend cannot create its directory.
    pub fn open_store(&self) -> Result<CredentialStore> {
        let backend: Arc<dyn crate::auth::store::StorageBackend> = match self.backend.as_str() {
            "file" => match &self.path {
                Some(path) => Arc::new(FileBackend::new_with_path(path.clone())?),
                None => Arc::new(FileBackend::new()?),
            },
            "keyring" => Arc::new(KeyringBackend::default()),
            "memory" => Arc::new(MemoryBackend::default()),
            other => {
                return Err(ClientError::Config(format!(
                    "Invalid storage backend: {}. Must be one of: {}",
                    other,
                    STORAGE_BACKENDS.join(", ")
                )))
            }
        };
        tracing::debug!(backend = %self.backend, "Opened credential store");
        Ok(CredentialStore::new(backend))
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Route of the login screen, used when the session is invalidated
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

fn default_login_route() -> String {
    DEFAULT_LOGIN_ROUTE.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_route: default_login_route(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ClientError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("UNIONSITE_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("UNIONSITE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid UNIONSITE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(locale) = std::env::var("UNIONSITE_LOCALE") {
            self.api.default_locale = locale;
        }

        if let Ok(backend) = std::env::var("UNIONSITE_STORAGE_BACKEND") {
            self.storage.backend = backend.to_lowercase();
        }

        if let Ok(path) = std::env::var("UNIONSITE_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(route) = std::env::var("UNIONSITE_LOGIN_ROUTE") {
            self.session.login_route = route;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(locale) = &cli.locale {
            self.api.default_locale = locale.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ClientError::Config("api.base_url cannot be empty".to_string()));
        }

        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(ClientError::Config(format!(
                "api.base_url is not a valid URL ({}): {}",
                self.api.base_url, e
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(ClientError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.api.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(ClientError::Config(format!(
                "api.timeout_seconds must be less than or equal to {}",
                MAX_TIMEOUT_SECONDS
            )));
        }

        if self.api.default_locale.trim().is_empty() {
            return Err(ClientError::Config(
                "api.default_locale cannot be empty".to_string(),
            ));
        }

        if !self.session.login_route.starts_with('/') {
            return Err(ClientError::Config(format!(
                "session.login_route must start with '/': {}",
                self.session.login_route
            )));
        }

        if !STORAGE_BACKENDS.contains(&self.storage.backend.as_str()) {
            return Err(ClientError::Config(format!(
                "Invalid storage backend: {}. Must be one of: {}",
                self.storage.backend,
                STORAGE_BACKENDS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir};
    use serial_test::serial;

    const ENV_VARS: [&str; 6] = [
        "UNIONSITE_API_BASE_URL",
        "UNIONSITE_TIMEOUT_SECONDS",
        "UNIONSITE_LOCALE",
        "UNIONSITE_STORAGE_BACKEND",
        "UNIONSITE_STORAGE_PATH",
        "UNIONSITE_LOGIN_ROUTE",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn status_cli() -> crate::cli::Cli {
        crate::cli::Cli {
            config: None,
            verbose: false,
            locale: None,
            command: crate::cli::Commands::Status,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.default_locale, "en");
        assert_eq!(config.storage.backend, "file");
        assert!(config.storage.path.is_none());
        assert_eq!(config.session.login_route, "/login");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unparseable_base_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_timeout_too_large() {
        let mut config = Config::default();
        config.api.timeout_seconds = 301;
        assert!(config.validate().is_err());
        config.api.timeout_seconds = 300;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_locale() {
        let mut config = Config::default();
        config.api.default_locale = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_relative_login_route() {
        let mut config = Config::default();
        config.session.login_route = "login".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_backend() {
        let mut config = Config::default();
        config.storage.backend = "sqlite".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: https://union.example/api
  timeout_seconds: 15
  default_locale: vi
storage:
  backend: keyring
session:
  login_route: /admin/login
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://union.example/api");
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(config.api.default_locale, "vi");
        assert_eq!(config.storage.backend, "keyring");
        assert_eq!(config.session.login_route, "/admin/login");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("api:\n  timeout_seconds: 5\n").unwrap();
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.api.default_locale, "en");
        assert_eq!(config.storage.backend, "file");
        assert_eq!(config.session.login_route, "/login");
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &status_cli()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
    }

    #[test]
    #[serial]
    fn test_load_reads_file() {
        clear_env();
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "api:\n  default_locale: vi\n");
        let config = Config::load(path.to_str().unwrap(), &status_cli()).unwrap();
        assert_eq!(config.api.default_locale, "vi");
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml_is_error() {
        clear_env();
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "api: [unclosed");
        let err = Config::load(path.to_str().unwrap(), &status_cli()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        clear_env();
        std::env::set_var("UNIONSITE_API_BASE_URL", "https://staging.example/api");
        std::env::set_var("UNIONSITE_TIMEOUT_SECONDS", "12");
        std::env::set_var("UNIONSITE_LOCALE", "vi");
        std::env::set_var("UNIONSITE_STORAGE_BACKEND", "Memory");
        std::env::set_var("UNIONSITE_STORAGE_PATH", "/tmp/creds.json");
        std::env::set_var("UNIONSITE_LOGIN_ROUTE", "/signin");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.api.base_url, "https://staging.example/api");
        assert_eq!(config.api.timeout_seconds, 12);
        assert_eq!(config.api.default_locale, "vi");
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/creds.json")));
        assert_eq!(config.session.login_route, "/signin");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_bad_timeout() {
        clear_env();
        std::env::set_var("UNIONSITE_TIMEOUT_SECONDS", "soon");
        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    #[serial]
    fn test_cli_locale_overrides_env() {
        clear_env();
        std::env::set_var("UNIONSITE_LOCALE", "fr");
        let mut cli = status_cli();
        cli.locale = Some("vi".to_string());
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        clear_env();
        assert_eq!(config.api.default_locale, "vi");
    }

    #[test]
    fn test_open_store_memory() {
        let config = StorageConfig {
            backend: "memory".to_string(),
            path: None,
        };
        let store = config.open_store().unwrap();
        assert!(!store.has_credentials().unwrap());
    }

    #[test]
    fn test_open_store_file_with_path() {
        let dir = temp_dir();
        let config = StorageConfig {
            backend: "file".to_string(),
            path: Some(dir.path().join("nested").join("credentials.json")),
        };
        let store = config.open_store().unwrap();
        store
            .save_tokens(&crate::auth::types::TokenPair::new("T1", "R1"))
            .unwrap();
        assert!(dir.path().join("nested").join("credentials.json").exists());
    }

    #[test]
    fn test_open_store_unknown_backend() {
        let config = StorageConfig {
            backend: "redis".to_string(),
            path: None,
        };
        assert!(matches!(config.open_store(), Err(ClientError::Config(_))));
    }
}
