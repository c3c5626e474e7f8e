//! USD to local-currency rate with its own hour-long cache.

use crate::cache::clock::{elapsed_millis, Clock};
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[derive(Debug, Clone, Copy)]
struct CachedRate {
    rate: f64,
    fetched_at: DateTime<Utc>,
}

pub struct ExchangeRateService {
    url: String,
    currency: String,
    fallback_rate: f64,
    ttl: Duration,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    last: RwLock<Option<CachedRate>>,
    metrics: Option<Arc<Metrics>>,
}

impl ExchangeRateService {
    pub fn new(
        url: impl Into<String>,
        currency: impl Into<String>,
        fallback_rate: f64,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            url: url.into(),
            currency: currency.into().to_uppercase(),
            fallback_rate,
            ttl,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            clock,
            last: RwLock::new(None),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Rate for converting USD prices. Refreshes when the cached value is
    /// older than the TTL; on failure keeps the last known rate, else the
    /// fallback constant, and holds it for another TTL.
    pub async fn get_rate(&self) -> f64 {
        let now = self.clock.now();
        if let Some(cached) = *self.last.read().await {
            if u128::from(elapsed_millis(cached.fetched_at, now)) < self.ttl.as_millis() {
                return cached.rate;
            }
        }

        match self.fetch_rate().await {
            Ok(rate) => {
                debug!(currency = %self.currency, rate, "Exchange rate refreshed");
                *self.last.write().await = Some(CachedRate {
                    rate,
                    fetched_at: now,
                });
                rate
            }
            Err(e) => {
                warn!(currency = %self.currency, error = %e, "Exchange rate fetch failed");
                if let Some(metrics) = &self.metrics {
                    metrics
                        .upstream_failures_total
                        .with_label_values(&["exchange_rate"])
                        .inc();
                }
                let mut last = self.last.write().await;
                let rate = last.map(|cached| cached.rate).unwrap_or(self.fallback_rate);
                *last = Some(CachedRate {
                    rate,
                    fetched_at: now,
                });
                rate
            }
        }
    }

    /// Best known rate without any I/O.
    pub async fn current_rate(&self) -> f64 {
        self.last
            .read()
            .await
            .map(|cached| cached.rate)
            .unwrap_or(self.fallback_rate)
    }

    async fn fetch_rate(&self) -> Result<f64> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<RatesResponse>()
            .await?;

        response
            .rates
            .get(&self.currency)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| Error::malformed(format!("no usable {} rate in response", self.currency)))
    }
}
