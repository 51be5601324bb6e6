/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `session`: login, logout, whoami, status
- `request`: send an arbitrary authenticated request

Handlers print to stdout and return library errors; the binary turns those
into a non-zero exit.
*/

use std::sync::Arc;

use colored::Colorize;

use crate::auth::api::AuthApi;
use crate::auth::session::Navigator;
use crate::config::Config;
use crate::error::Result;
use crate::http::client::AuthClient;

pub mod request;
pub mod session;

/// [`Navigator`] for the terminal: tells the operator to sign in again.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "Redirecting to login");
        eprintln!(
            "{} Your session has ended. Run `unionsite login` to sign in again.",
            "!".yellow().bold()
        );
    }
}

/// Build the authenticated client and session API from configuration
///
/// # Errors
///
/// Returns error if the base URL is unusable or the credential store cannot
/// be opened
pub fn build_api(config: &Config) -> Result<AuthApi> {
    let client = AuthClient::from_config(config, Arc::new(TerminalNavigator))?;
    Ok(AuthApi::new(client))
}
