//! cf-tracker server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser / cf-cli
//!         │
//!         ▼
//!     ┌────────────┐     ┌──────────────┐     ┌────────────────────────────┐
//!     │ http       │────▶│ gate         │────▶│ counter store              │
//!     │ server     │     │ tiers, quota │     │ memory / redis             │
//!     └─────┬──────┘     └──────────────┘     └────────────────────────────┘
//!           │
//!           ▼
//!     ┌────────────┐     ┌──────────────┐     ┌────────────────────────────┐
//!     │ stats      │────▶│ remote       │────▶│ relay → direct → proxies   │
//!     │ leaderboard│     │ client       │     │ (ordered failover)         │
//!     └────────────┘     └──────────────┘     └────────────────────────────┘
//! ```
//!
//! The config path is taken from the first argument, then `CF_TRACKER_CONFIG`;
//! without either, defaults plus environment overrides are used.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use cf_tracker::config::{load_config, load_default, TrackerConfig};
use cf_tracker::gate::{build_store, QuotaGate};
use cf_tracker::http::{AppState, HttpServer};
use cf_tracker::lifecycle::Shutdown;
use cf_tracker::observability::{logging, metrics};
use cf_tracker::remote::ResilientClient;

const ENV_CONFIG_PATH: &str = "CF_TRACKER_CONFIG";

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from))
}

fn load() -> Result<TrackerConfig, cf_tracker::config::ConfigError> {
    match config_path() {
        Some(path) => load_config(&path),
        None => load_default(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load()?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        tracked = config.tracked.len(),
        daily_limit = config.gate.daily_limit,
        "cf-tracker starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = build_store(&config.store).await?;
    let gate = Arc::new(QuotaGate::new(&config.gate, store));
    let client = Arc::new(ResilientClient::from_config(&config.remote)?);
    let state = AppState::new(&config, client, gate)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    shutdown.watch_ctrl_c();

    HttpServer::new(&config, state)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
