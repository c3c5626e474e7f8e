//! Equity quotes: batch endpoint, per-symbol fallback, then static quotes.
//!
//! Failures are isolated per instrument; one bad symbol never empties the
//! batch.

use crate::cache::SnapshotSource;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::models::market::EquityQuote;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_batch(&self, symbols: &[String]) -> Result<Vec<EquityQuote>>;

    async fn fetch_quote(&self, symbol: &str) -> Result<EquityQuote>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRow {
    symbol: String,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartResponse,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
}

fn quote_id(symbol: &str) -> String {
    symbol.to_lowercase()
}

/// Yahoo-style quote API (`/v7/finance/quote` batch, `/v8/finance/chart` single).
pub struct YahooQuoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooQuoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteClient {
    async fn fetch_batch(&self, symbols: &[String]) -> Result<Vec<EquityQuote>> {
        let url = format!("{}/v7/finance/quote", self.base_url);
        let envelope = self
            .client
            .get(&url)
            .query(&[("symbols", symbols.join(","))])
            .send()
            .await?
            .error_for_status()?
            .json::<QuoteEnvelope>()
            .await?;

        Ok(envelope
            .quote_response
            .result
            .into_iter()
            .filter_map(|row| {
                Some(EquityQuote {
                    id: quote_id(&row.symbol),
                    name: row.short_name.unwrap_or_else(|| row.symbol.clone()),
                    current_price: row.regular_market_price?,
                    price_change_percentage_24h: row.regular_market_change_percent.unwrap_or(0.0),
                    symbol: row.symbol,
                })
            })
            .collect())
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<EquityQuote> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let envelope = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<ChartEnvelope>()
            .await?;

        let meta = envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|result| result.meta)
            .ok_or_else(|| Error::malformed(format!("empty chart response for {}", symbol)))?;

        let price = meta
            .regular_market_price
            .ok_or_else(|| Error::malformed(format!("no market price for {}", symbol)))?;
        let change = match meta.chart_previous_close {
            Some(previous) if previous > 0.0 => (price - previous) / previous * 100.0,
            _ => 0.0,
        };

        Ok(EquityQuote {
            id: quote_id(&meta.symbol),
            name: meta.short_name.unwrap_or_else(|| meta.symbol.clone()),
            current_price: price,
            price_change_percentage_24h: change,
            symbol: meta.symbol,
        })
    }
}

/// Quotes served for a symbol whose live fetch failed.
pub fn static_fallback_quotes() -> Vec<EquityQuote> {
    [
        ("samsung", "005930.KS", "삼성전자", 78500.0, 1.2),
        ("sk-hynix", "000660.KS", "SK하이닉스", 142000.0, -0.8),
        ("lg-energy", "373220.KS", "LG에너지솔루션", 412000.0, 0.5),
        ("hyundai-motor", "005380.KS", "현대자동차", 215000.0, 2.1),
        ("naver", "035420.KS", "NAVER", 198000.0, 0.3),
        ("kakao", "035720.KS", "카카오", 51200.0, -0.2),
    ]
    .into_iter()
    .map(|(id, symbol, name, price, change)| EquityQuote {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price: price,
        price_change_percentage_24h: change,
    })
    .collect()
}

pub struct EquityFetcher {
    provider: Arc<dyn QuoteProvider>,
    symbols: Vec<String>,
    fallbacks: HashMap<String, EquityQuote>,
    metrics: Option<Arc<Metrics>>,
}

impl EquityFetcher {
    pub fn new(provider: Arc<dyn QuoteProvider>, symbols: Vec<String>) -> Self {
        Self::with_fallbacks(provider, symbols, static_fallback_quotes())
    }

    pub fn with_fallbacks(
        provider: Arc<dyn QuoteProvider>,
        symbols: Vec<String>,
        fallbacks: Vec<EquityQuote>,
    ) -> Self {
        Self {
            provider,
            symbols,
            fallbacks: fallbacks
                .into_iter()
                .map(|quote| (quote.symbol.clone(), quote))
                .collect(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// One quote per configured symbol, in configuration order.
    pub async fn fetch_equity_quotes(&self) -> Vec<EquityQuote> {
        if self.symbols.is_empty() {
            return Vec::new();
        }

        let mut by_symbol: HashMap<String, EquityQuote> = match self.provider.fetch_batch(&self.symbols).await {
            Ok(quotes) => quotes
                .into_iter()
                .map(|quote| (quote.symbol.clone(), quote))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Batch quote fetch failed, fetching symbols one by one");
                self.record_failure("quote_batch");
                HashMap::new()
            }
        };

        let mut quotes = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            if let Some(quote) = by_symbol.remove(symbol) {
                quotes.push(quote);
                continue;
            }

            match self.provider.fetch_quote(symbol).await {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    self.record_failure("quote_single");
                    match self.fallbacks.get(symbol) {
                        Some(fallback) => {
                            warn!(symbol = %symbol, error = %e, "Quote fetch failed, using static quote");
                            quotes.push(fallback.clone());
                        }
                        None => {
                            warn!(symbol = %symbol, error = %e, "Quote fetch failed and no static quote exists");
                        }
                    }
                }
            }
        }

        debug!(count = quotes.len(), "Equity quotes assembled");
        quotes
    }

    fn record_failure(&self, source: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.upstream_failures_total.with_label_values(&[source]).inc();
        }
    }
}

#[async_trait]
impl SnapshotSource<EquityQuote> for EquityFetcher {
    async fn fetch_snapshot(&self) -> Vec<EquityQuote> {
        self.fetch_equity_quotes().await
    }
}
