//! Crypto ticker fetch with bounded retry and secondary-source fallback.

use crate::cache::SnapshotSource;
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::models::market::Ticker;
use crate::services::exchange_rate::ExchangeRateService;
use crate::services::market_data::TickerSource;
use crate::services::normalize::normalize_tickers;
use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct MarketDataFetcher {
    primary: Arc<dyn TickerSource>,
    secondary: Arc<dyn TickerSource>,
    rates: Arc<ExchangeRateService>,
    config: FetchConfig,
    metrics: Option<Arc<Metrics>>,
}

impl MarketDataFetcher {
    pub fn new(
        primary: Arc<dyn TickerSource>,
        secondary: Arc<dyn TickerSource>,
        rates: Arc<ExchangeRateService>,
        config: FetchConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            rates,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn rates(&self) -> &Arc<ExchangeRateService> {
        &self.rates
    }

    pub fn quote_asset(&self) -> &str {
        &self.config.quote_asset
    }

    /// Normalized tickers from the primary source, or from the secondary once
    /// the primary's attempts are exhausted. Never fails: total failure is an
    /// empty vector and the caller decides what to serve instead.
    pub async fn fetch_crypto_tickers(&self) -> Vec<Ticker> {
        let rate = self.rates.get_rate().await;

        match self.fetch_primary_with_retry(rate).await {
            Ok(tickers) => return tickers,
            Err(e) => {
                warn!(
                    source = self.primary.name(),
                    error = %e,
                    "Primary ticker source exhausted, falling back to {}",
                    self.secondary.name()
                );
            }
        }

        match self.fetch_from(self.secondary.as_ref(), rate).await {
            Ok(tickers) => {
                info!(source = self.secondary.name(), count = tickers.len(), "Tickers served by fallback source");
                tickers
            }
            Err(e) => {
                error!(source = self.secondary.name(), error = %e, "Fallback ticker source failed");
                Vec::new()
            }
        }
    }

    async fn fetch_primary_with_retry(&self, rate: f64) -> Result<Vec<Ticker>> {
        let backoff = ConstantBuilder::default()
            .with_delay(self.config.retry_delay)
            .with_max_times(self.config.retry_attempts.saturating_sub(1));

        (|| self.fetch_from(self.primary.as_ref(), rate))
            .retry(backoff)
            .notify(|e: &Error, delay: Duration| {
                warn!(
                    source = self.primary.name(),
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Ticker fetch attempt failed"
                );
            })
            .await
    }

    async fn fetch_from(&self, source: &dyn TickerSource, rate: f64) -> Result<Vec<Ticker>> {
        let outcome = source.fetch_tickers().await.and_then(|raw| {
            let tickers = normalize_tickers(&raw, &self.config.quote_asset, rate);
            if tickers.is_empty() {
                Err(Error::upstream(format!("{} returned no usable tickers", source.name())))
            } else {
                Ok(tickers)
            }
        });

        if outcome.is_err() {
            if let Some(metrics) = &self.metrics {
                metrics
                    .upstream_failures_total
                    .with_label_values(&[source.name()])
                    .inc();
            }
        }
        outcome
    }
}

#[async_trait]
impl SnapshotSource<Ticker> for MarketDataFetcher {
    async fn fetch_snapshot(&self) -> Vec<Ticker> {
        self.fetch_crypto_tickers().await
    }
}
