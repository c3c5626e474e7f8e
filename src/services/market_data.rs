//! Market data source interfaces.
//!
//! Concrete upstream clients implement these traits so the fetcher, the
//! prediction pipeline and the tests can swap sources freely.

use crate::error::Result;
use crate::models::indicators::Candle;
use async_trait::async_trait;

/// A ticker as reported by an upstream source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTicker {
    /// Uppercase base asset, e.g. `BTC`.
    pub base: String,
    /// Quote asset the price is denominated in; `None` when the pair could
    /// not be split against the designated quote asset.
    pub quote: Option<String>,
    pub name: Option<String>,
    pub price_usd: f64,
    pub change_percent_24h: f64,
    pub volume: f64,
    pub quote_volume: f64,
}

#[async_trait]
pub trait TickerSource: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn fetch_tickers(&self) -> Result<Vec<RawTicker>>;
}

#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Candles for a base symbol (e.g. `BTC`) at `interval`, oldest first.
    async fn get_candles(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>>;
}
