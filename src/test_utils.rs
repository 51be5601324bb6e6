//! Test utilities for unionsite
//!
//! This module provides common test utilities including temporary directory
//! management, a recording navigator, and assertion helpers.

use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::TempDir;

use crate::auth::session::Navigator;
use crate::config::Config;
use crate::error::ClientError;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T, ClientError>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration backed by in-memory credential storage
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.storage.backend = "memory".to_string();
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
api:
  base_url: http://localhost:8080/api
  timeout_seconds: 10
  default_locale: vi

storage:
  backend: memory

session:
  login_route: /admin/login
"#
    .to_string()
}

/// [`Navigator`] that remembers every route it was sent to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Routes navigated to, oldest first.
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<(), ClientError> =
            Err(ClientError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<(), ClientError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_test_config_is_valid() {
        let config = test_config();
        assert_eq!(config.storage.backend, "memory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.api.default_locale, "vi");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_recording_navigator_keeps_order() {
        let navigator = RecordingNavigator::default();
        navigator.navigate("/login");
        navigator.navigate("/home");
        assert_eq!(navigator.routes(), vec!["/login", "/home"]);
    }
}
