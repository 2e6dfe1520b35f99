//! Storefront - Application entry point
//!
//! CLI-based entry point that dispatches to the individual commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::{
    cli::{Cli, Commands},
    commands,
    config::Config,
    errors::{AppError, AppResult},
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {}", describe(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    if let Some(path) = &cli.config {
        dotenvy::from_path(path).map_err(|e| {
            AppError::internal(format!("Failed to load {}: {}", path.display(), e))
        })?;
    }

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
        Commands::Seed(args) => commands::seed::execute(args, config).await,
    }
}

/// Operator-facing message, including the details hidden from HTTP clients
fn describe(error: &AppError) -> String {
    match error {
        AppError::Database(e) => format!("database error: {}", e),
        AppError::Session(msg) | AppError::Internal(msg) => msg.clone(),
        other => other.to_string(),
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
