//! Reconnecting consumer of the streaming ticker feed.

use super::connection::{ConnectionState, ConnectionTracker, StreamEvent};
use super::snapshot::LiveSnapshot;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::services::binance::parse_mini_ticker_batch;
use crate::services::exchange_rate::ExchangeRateService;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Text frames of one connection. The stream ends when the connection does.
pub type MessageStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self) -> Result<MessageStream>;
}

/// Waits out the reconnect delay. Swapped for an immediate timer in tests.
#[async_trait]
pub trait ReconnectTimer: Send + Sync {
    async fn wait(&self, delay: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[async_trait]
impl ReconnectTimer for TokioTimer {
    async fn wait(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

pub struct RealtimeMerger {
    connector: Arc<dyn StreamConnector>,
    timer: Arc<dyn ReconnectTimer>,
    snapshot: Arc<LiveSnapshot>,
    rates: Arc<ExchangeRateService>,
    reconnect_delay: Duration,
    status: watch::Sender<ConnectionState>,
    metrics: Option<Arc<Metrics>>,
}

impl RealtimeMerger {
    pub fn new(
        connector: Arc<dyn StreamConnector>,
        snapshot: Arc<LiveSnapshot>,
        rates: Arc<ExchangeRateService>,
        reconnect_delay: Duration,
    ) -> Self {
        let (status, _) = watch::channel(ConnectionState::Connecting);
        Self {
            connector,
            timer: Arc::new(TokioTimer),
            snapshot,
            rates,
            reconnect_delay,
            status,
            metrics: None,
        }
    }

    pub fn with_timer(mut self, timer: Arc<dyn ReconnectTimer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn snapshot(&self) -> &Arc<LiveSnapshot> {
        &self.snapshot
    }

    pub fn status(&self) -> ConnectionState {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionState> {
        self.status.subscribe()
    }

    /// Connect, merge, and reconnect after the fixed delay, forever.
    pub async fn run(&self) {
        let mut tracker = ConnectionTracker::new(self.reconnect_delay);

        loop {
            tracker.begin_connect();
            self.publish(&tracker);

            match self.connector.connect().await {
                Ok(mut messages) => {
                    self.on_event(&mut tracker, StreamEvent::Open);
                    info!("Ticker stream connected");

                    while let Some(frame) = messages.next().await {
                        match frame {
                            Ok(text) => {
                                self.on_event(&mut tracker, StreamEvent::Message);
                                self.handle_message(&text).await;
                            }
                            Err(e) => {
                                self.on_event(&mut tracker, StreamEvent::Error(e.to_string()));
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    self.on_event(&mut tracker, StreamEvent::Error(e.to_string()));
                }
            }

            let delay = self
                .on_event(&mut tracker, StreamEvent::Close)
                .unwrap_or(self.reconnect_delay);
            info!(
                reconnects = tracker.reconnects(),
                delay_ms = delay.as_millis() as u64,
                "Ticker stream closed, reconnecting"
            );
            self.timer.wait(delay).await;
        }
    }

    /// Parse one frame and patch the live snapshot. Returns the entries patched.
    pub async fn handle_message(&self, text: &str) -> usize {
        let ticks = match parse_mini_ticker_batch(text) {
            Ok(ticks) => ticks,
            Err(e) => {
                warn!(error = %e, "Discarding unparseable stream frame");
                return 0;
            }
        };
        if ticks.is_empty() {
            return 0;
        }

        let rate = self.rates.current_rate().await;
        let patched = self.snapshot.apply_batch(&ticks, rate).await;
        debug!(ticks = ticks.len(), patched, "Stream batch merged");
        if let Some(metrics) = &self.metrics {
            metrics.stream_ticks_applied_total.inc_by(patched as u64);
        }
        patched
    }

    fn on_event(&self, tracker: &mut ConnectionTracker, event: StreamEvent) -> Option<Duration> {
        if let StreamEvent::Error(reason) = &event {
            warn!(error = %reason, "Ticker stream error");
        }
        let delay = tracker.handle(&event);
        if event != StreamEvent::Message {
            self.publish(tracker);
        }
        delay
    }

    fn publish(&self, tracker: &ConnectionTracker) {
        let state = tracker.state();
        self.status.send_replace(state);
        if let Some(metrics) = &self.metrics {
            metrics
                .websocket_connected
                .set(if state == ConnectionState::Connected { 1.0 } else { 0.0 });
        }
    }
}
