//! Marketlens API Server
//!
//! Serves price snapshots, the live stream-patched view and AI
//! recommendations. The ticker stream runs in-process unless
//! `REALTIME_ENABLED=false`.

use dotenvy::dotenv;
use marketlens::config::Config;
use marketlens::core::http::start_server;
use marketlens::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env();
    let env = marketlens::config::get_environment();
    let port = config.port;
    info!("Starting Marketlens API Server");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);
    info!(
        realtime = config.realtime_enabled,
        ai_enabled = config.reasoning.credential().is_some(),
        "Features"
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
