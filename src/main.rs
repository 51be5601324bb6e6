//! unionsite - student union site API client
//!
#![doc = "unionsite - student union site API client"]
#![doc = "Main entry point for the unionsite command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use unionsite::cli::{Cli, Commands};
use unionsite::commands;
use unionsite::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let api = commands::build_api(&config)?;

    // Execute command
    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&api, &email, &password).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::session::logout(&api).await?;
            Ok(())
        }
        Commands::Whoami { cached } => {
            commands::session::whoami(&api, cached).await?;
            Ok(())
        }
        Commands::Request { method, path, body } => {
            tracing::info!("Sending {} {}", method, path);
            commands::request::send_request(api.client(), &method, &path, body.as_deref())
                .await?;
            Ok(())
        }
        Commands::Status => {
            commands::session::status(&api)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "unionsite=debug"
    } else {
        "unionsite=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
