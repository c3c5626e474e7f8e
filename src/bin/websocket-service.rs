//! Marketlens WebSocket Service
//!
//! Standalone consumer of the streaming ticker feed. Seeds the live snapshot
//! from a REST fetch, keeps it patched from the stream and periodically logs
//! the connection state and the biggest movers.

use dotenvy::dotenv;
use marketlens::config::Config;
use marketlens::core::Services;
use marketlens::logging;
use marketlens::metrics::Metrics;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{info, warn};

const REPORT_INTERVAL: Duration = Duration::from_secs(30);
const TOP_MOVERS: usize = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env();
    let env = marketlens::config::get_environment();
    info!("Starting Marketlens WebSocket Service");
    info!(environment = %env, "Environment");
    info!(url = %config.upstream.binance_ws_url, "Ticker stream");

    let metrics = Arc::new(Metrics::new()?);
    let services = Services::from_config(&config, metrics);

    let seed = services.fetcher.fetch_crypto_tickers().await;
    if seed.is_empty() {
        warn!("Initial ticker fetch returned nothing; stream ticks will have no rows to patch");
    } else {
        info!(tickers = seed.len(), "Live snapshot seeded");
    }
    services.live.replace(seed).await;

    let ws_service = services.websocket.clone();
    ws_service.start().await;

    let reporter = ws_service.spawn_status_reporter(REPORT_INTERVAL, TOP_MOVERS);

    info!("WebSocket service started and running. Waiting for shutdown signal...");
    info!("Note: This service should run as a singleton (one instance)");
    signal::ctrl_c().await?;
    info!("Shutting down WebSocket service...");
    reporter.abort();
    ws_service.stop().await;
    info!("WebSocket service stopped");

    Ok(())
}
