//! Database probe - application entry point
//!
//! CLI-based entry point that dispatches to the probe commands.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use data_repository::{set_connection_string_name, DataSettings};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    let settings = match cli.connection_string_name {
        Some(name) => {
            set_connection_string_name(name.as_str());
            DataSettings::new(name)
        }
        None => DataSettings::from_env(),
    };
    tracing::debug!("Settings loaded: {:?}", settings);

    // Execute command
    let result = match cli.command {
        Commands::Check => commands::check(settings).await,
        Commands::Show => commands::show(settings),
    };

    // Handle errors
    if let Err(e) = result {
        tracing::error!("Command failed [{}]: {}", e.code(), e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
