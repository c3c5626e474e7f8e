//! Binance REST client: 24h ticker snapshot and klines.

use super::messages::{parse_kline, Ticker24h};
use crate::error::{Error, Result};
use crate::models::indicators::Candle;
use crate::services::market_data::{CandleSource, RawTicker, TickerSource};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct BinanceRestClient {
    base_url: String,
    quote_asset: String,
    client: reqwest::Client,
}

impl BinanceRestClient {
    pub fn new(base_url: impl Into<String>, quote_asset: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base_url, quote_asset, client)
    }

    pub fn with_client(
        base_url: impl Into<String>,
        quote_asset: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            quote_asset: quote_asset.into().to_uppercase(),
            client,
        }
    }

    pub async fn get_24h_tickers(&self) -> Result<Vec<Ticker24h>> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let tickers = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Ticker24h>>()
            .await?;
        Ok(tickers)
    }

    pub async fn get_klines(&self, pair: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let rows = self
            .client
            .get(&url)
            .query(&[
                ("symbol", pair.to_string()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Vec<Value>>>()
            .await?;

        let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline(row)).collect();
        if candles.len() != rows.len() {
            return Err(Error::malformed(format!(
                "{} of {} klines for {} could not be parsed",
                rows.len() - candles.len(),
                rows.len(),
                pair
            )));
        }
        Ok(candles)
    }

    fn to_raw(&self, ticker: &Ticker24h) -> Option<RawTicker> {
        let (base, quote) = match ticker.symbol.strip_suffix(self.quote_asset.as_str()) {
            Some(base) => (base.to_string(), Some(self.quote_asset.clone())),
            None => (ticker.symbol.clone(), None),
        };
        Some(RawTicker {
            base,
            quote,
            name: None,
            price_usd: ticker.last_price.parse().ok()?,
            change_percent_24h: ticker.price_change_percent.parse().ok()?,
            volume: ticker.volume.parse().ok()?,
            quote_volume: ticker.quote_volume.parse().ok()?,
        })
    }
}

#[async_trait]
impl TickerSource for BinanceRestClient {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch_tickers(&self) -> Result<Vec<RawTicker>> {
        let tickers = self.get_24h_tickers().await?;
        let raw: Vec<RawTicker> = tickers.iter().filter_map(|t| self.to_raw(t)).collect();
        debug!(received = tickers.len(), usable = raw.len(), "Binance 24h tickers fetched");
        Ok(raw)
    }
}

#[async_trait]
impl CandleSource for BinanceRestClient {
    async fn get_candles(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        let pair = format!("{}{}", symbol.to_uppercase(), self.quote_asset);
        self.get_klines(&pair, interval, limit).await
    }
}
