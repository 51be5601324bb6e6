//! Command-line interface definition for unionsite
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for signing in and out, inspecting the session, and
//! sending authenticated requests.

use clap::{Parser, Subcommand};

/// unionsite - student union site API client
///
/// Signs in to the site API, keeps the session fresh, and sends
/// authenticated requests on your behalf.
#[derive(Parser, Debug, Clone)]
#[command(name = "unionsite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Language for Accept-Language (overrides config)
    #[arg(short, long, global = true)]
    pub locale: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for unionsite
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "UNIONSITE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and clear stored credentials
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Print the cached profile without contacting the server
        #[arg(long)]
        cached: bool,
    },

    /// Send an authenticated request
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// Request path relative to the API base URL
        path: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Show whether credentials are stored
    Status,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            locale: None,
            command: Commands::Status,
        }
    }
}
