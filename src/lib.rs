//! unionsite - authenticated API client for the student union site
//!
//! This library signs in to the site API, persists the session, and sends
//! requests with the stored access token attached. When the server rejects a
//! token, the session is refreshed once and every request that was rejected
//! meanwhile is replayed with the new token.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Credential storage, login/logout/profile calls, session invalidation
//! - `http`: Request model, decoration, transport, and the refresh coordinator
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers for the CLI subcommands
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use unionsite::auth::{AuthApi, LogNavigator};
//! use unionsite::http::AuthClient;
//! use unionsite::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = AuthClient::from_config(&config, Arc::new(LogNavigator))?;
//!     let api = AuthApi::new(client.clone());
//!     api.login("editor@union.example", "secret").await?;
//!
//!     let events: serde_json::Value = client.get_json("/events").await?;
//!     println!("{events}");
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;

// Re-export commonly used types
pub use auth::{AuthApi, CredentialStore, Navigator};
pub use config::Config;
pub use error::{ClientError, Result};
pub use http::{ApiRequest, ApiResponse, AuthClient};

#[cfg(test)]
pub mod test_utils;
