//! WebSocket service for maintaining the long-lived ticker stream

use crate::models::market::{sort_tickers, SortOrder};
use crate::realtime::{ConnectionState, RealtimeMerger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

/// Owns the background task that keeps the ticker stream connected and
/// merges its batches into the live snapshot.
///
/// Run one per process; every instance opens its own upstream connection.
pub struct WebSocketService {
    merger: Arc<RealtimeMerger>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl WebSocketService {
    pub fn new(merger: RealtimeMerger) -> Self {
        Self {
            merger: Arc::new(merger),
            handle: Arc::new(RwLock::new(None)),
        }
    }

    /// Spawn the reconnect loop. Calling it again while running is a no-op.
    pub async fn start(&self) {
        let mut handle = self.handle.write().await;
        if handle.is_some() {
            return;
        }

        let merger = self.merger.clone();
        *handle = Some(tokio::spawn(async move {
            merger.run().await;
        }));
        info!("WebSocket service started");
    }

    /// Stop the WebSocket service
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("WebSocket service stopped");
        }
    }

    /// Log the connection state and the biggest movers every `every`.
    /// The caller owns the handle and aborts it on shutdown.
    pub fn spawn_status_reporter(&self, every: Duration, top_movers: usize) -> JoinHandle<()> {
        let merger = self.merger.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let status = merger.status();
                let live = merger.snapshot();
                let tickers = live.tickers().await;
                let last_update = live.last_update().await;
                let gainers: Vec<String> = sort_tickers(&tickers, Some(SortOrder::Gainers), Some(top_movers))
                    .into_iter()
                    .map(|t| format!("{} {:+.2}%", t.symbol, t.price_change_percentage_24h))
                    .collect();
                info!(
                    status = ?status,
                    connected = status == ConnectionState::Connected,
                    tickers = tickers.len(),
                    last_update = ?last_update,
                    top_gainers = ?gainers,
                    "Stream status"
                );
            }
        })
    }

    pub fn merger(&self) -> Arc<RealtimeMerger> {
        self.merger.clone()
    }

    pub fn status(&self) -> ConnectionState {
        self.merger.status()
    }

    /// Check if the service is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
