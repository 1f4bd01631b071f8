//! Circadia API Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from a TOML file (see `--config`) with environment overrides:
//! - `CIRCADIA_DATA_DIR`: Data directory for the SQLite stores
//! - `CIRCADIA_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `CIRCADIA_API_PORT`: Port to listen on (default: 8086)
//! - `CIRCADIA_LOG_LEVEL`: Log level (default: info)
//! - `CIRCADIA_LOG_FORMAT`: pretty or json (default: pretty)
//! - `RUST_LOG`: Overrides the log filter entirely when set

use circadia::api::{serve, ApiConfig, AppState};
use circadia::config::{self, Config, LoggingConfig};
use circadia::store::{EventLog, InsightStore};
use circadia::websocket::HubConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Circadian wellness tracking service
#[derive(Debug, Parser)]
#[command(name = "circadia", version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a default config file to stdout and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.write_default_config {
        print!("{}", config::generate_default_config());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting Circadia v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", config.store.data_dir);

    let data_dir = PathBuf::from(&config.store.data_dir);
    let events = EventLog::open(&data_dir)?;
    let insights = InsightStore::open(&data_dir)?;
    tracing::info!("Stores opened");

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        request_timeout_ms: config.api.request_timeout_secs * 1000,
        ..Default::default()
    };
    let hub_config = HubConfig {
        max_connections: config.notifications.max_connections,
    };

    let state = AppState::with_hub_config(events, insights, api_config.clone(), hub_config);

    serve(state, &api_config).await?;

    tracing::info!("Circadia stopped");
    Ok(())
}

/// Initialize tracing with the configured level and format
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "circadia={},tower_http=info",
            logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
