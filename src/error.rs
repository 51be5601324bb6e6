//! Error types for Unionsite
//!
//! This module defines the error type shared by the credential store, the
//! dispatcher, and the refresh coordinator, using `thiserror` for ergonomic
//! error handling.
//!
//! [`ClientError`] is `Clone` so that a single refresh failure can be
//! delivered verbatim to every request that was waiting on it.

use thiserror::Error;

/// Main error type for Unionsite operations
///
/// This enum encompasses all errors that can surface from sending a request
/// through the authenticated client: transport failures, non-success HTTP
/// statuses, authentication and refresh failures, and credential storage
/// problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request could not be built (bad path, bad header value, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The transport failed before a response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting for a response
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code returned by the server
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// A 401 was received but no refresh token is stored
    #[error("Authentication error: no refresh token available")]
    MissingRefreshToken,

    /// Authentication errors (rejected credentials, malformed token payload)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Credential storage errors (file backend, serialization of stored values)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when this error is an HTTP `401 Unauthorized`.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<keyring::Error> for ClientError {
    fn from(e: keyring::Error) -> Self {
        Self::Keyring(e.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_builder() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Result type alias for Unionsite operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ClientError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_status_error_display() {
        let error = ClientError::Status {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 404: not found");
    }

    #[test]
    fn test_missing_refresh_token_display() {
        let error = ClientError::MissingRefreshToken;
        assert_eq!(
            error.to_string(),
            "Authentication error: no refresh token available"
        );
    }

    #[test]
    fn test_status_accessor() {
        let error = ClientError::Status {
            status: 401,
            body: String::new(),
        };
        assert_eq!(error.status(), Some(401));
        assert!(error.is_unauthorized());
        assert_eq!(ClientError::Transport("reset".into()).status(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ClientError = io_error.into();
        assert!(matches!(error, ClientError::Storage(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: ClientError = json_error.into();
        assert!(matches!(error, ClientError::Serialization(_)));
    }

    #[test]
    fn test_error_clone_is_equal() {
        let error = ClientError::Authentication("refresh rejected".to_string());
        assert_eq!(error.clone(), error);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
