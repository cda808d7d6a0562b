use clap::Parser;
use polla::adapters::PostgresStore;
use polla::ai::AiBackend;
use polla::api::{self, AppState};
use polla::cli::{Cli, Commands};
use polla::config::AppConfig;
use polla::error::{PollaError, Result};
use polla::events::{EventBus, JitterRange, TeamsAssignedListener};
use polla::logging::{init_logging, init_logging_simple};
use polla::predictions::{PredictionService, RetryPolicy};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Migrate) => {
            init_logging_simple();
            let config = load_config(&cli.config_dir)?;
            let store = PostgresStore::new(&config.database.url, config.database.max_connections).await?;
            store.migrate().await?;
        }
        Some(Commands::Serve { migrate }) => run_server(&cli.config_dir, *migrate).await?,
        None => run_server(&cli.config_dir, false).await?,
    }

    Ok(())
}

fn load_config(config_dir: &str) -> Result<AppConfig> {
    let config = AppConfig::load_from(config_dir)?;
    config
        .validate()
        .map_err(|errors| PollaError::InvalidConfig(errors.join("; ")))?;
    Ok(config)
}

async fn run_server(config_dir: &str, migrate: bool) -> Result<()> {
    let config = load_config(config_dir)?;
    init_logging(&config.logging);
    info!(config_dir, "starting La Polla predictions service");

    let store = PostgresStore::new(&config.database.url, config.database.max_connections).await?;
    if migrate {
        store.migrate().await?;
    }

    let backend = AiBackend::from_config(&config.ai);
    if !backend.is_available() {
        warn!("running in fallback-only mode");
    }

    let predictions = PredictionService::new(
        Arc::new(store),
        backend,
        RetryPolicy::from(&config.predictions),
    );

    let events = EventBus::default();
    let listener = TeamsAssignedListener::new(
        predictions.controller().clone(),
        JitterRange::from(&config.predictions),
    );
    let listener_stats = listener.stats();
    let listener_handle = listener.spawn(events.subscribe());

    let state = AppState::new(predictions, events.clone(), listener_stats);
    api::serve(&config.server, state).await?;

    // Closing the bus lets the listener finish in-flight predictions and exit.
    drop(events);
    if let Err(e) = listener_handle.await {
        warn!(error = %e, "teams-assigned listener ended abnormally");
    }

    Ok(())
}
