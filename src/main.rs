//! ChatVault - Conversation storage backend
//!
//! Main entry point: parses the CLI, loads configuration, and dispatches
//! to the HTTP server or the sample-data seeder.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatvault::cli::{Cli, Commands};
use chatvault::config::Config;
use chatvault::providers::{create_provider, ChatClient};
use chatvault::server::{run_server, AppState};
use chatvault::storage::SqliteStorage;
use chatvault::seed;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a db path on the CLI, mirror it into
    // CHATVAULT_DB so the storage initializer can pick it up. This keeps
    // callers unchanged while allowing `SqliteStorage::new()` to honor an
    // override.
    if let Some(db_path) = &cli.db_path {
        std::env::set_var("CHATVAULT_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path.display());
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let mut config = Config::load(config_path, &cli)?;

    // Config-file db_path has the lowest precedence: it only applies when
    // neither the CLI flag nor CHATVAULT_DB set the variable above.
    if std::env::var_os("CHATVAULT_DB").is_none() {
        if let Some(db_path) = &config.storage.db_path {
            std::env::set_var("CHATVAULT_DB", db_path);
        }
    }

    // Execute command
    match cli.command {
        Commands::Serve { port, provider } => {
            if let Some(provider) = provider {
                tracing::debug!("Using provider override: {}", provider);
                config.provider.provider_type = provider;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            config.validate()?;

            let storage = SqliteStorage::new()?;
            let provider = create_provider(&config.provider.provider_type, &config.provider)?;
            let chat = ChatClient::new(provider);
            let state = Arc::new(AppState::new(storage, chat));

            tracing::info!(
                "Starting ChatVault with provider {}",
                config.provider.provider_type
            );
            run_server(state, &config.server.host, config.server.port).await?;
            Ok(())
        }
        Commands::Seed { fresh } => {
            let storage = SqliteStorage::new()?;
            seed::run(&storage, fresh)?;
            println!("Sample conversations created.");
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatvault=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
