//! Live snapshot patched in place by streaming ticks.

use crate::models::market::{StreamTick, Ticker};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Merge a tick batch into `tickers` by wire symbol. Only the USD price, the
/// local price and the quote volume of matching entries change; the 24h
/// change stays as last fetched. Unknown symbols are ignored and never
/// inserted. Returns the number of entries patched.
pub fn merge_ticks(tickers: &mut [Ticker], ticks: &[StreamTick], quote_asset: &str, exchange_rate: f64) -> usize {
    if ticks.is_empty() {
        return 0;
    }
    let by_symbol: HashMap<&str, &StreamTick> = ticks
        .iter()
        .map(|tick| (tick.symbol.as_str(), tick))
        .collect();

    let mut patched = 0;
    for ticker in tickers.iter_mut() {
        let Some(tick) = by_symbol.get(ticker.wire_symbol(quote_asset).as_str()) else {
            continue;
        };
        apply_tick(ticker, tick, exchange_rate);
        patched += 1;
    }
    patched
}

fn apply_tick(ticker: &mut Ticker, tick: &StreamTick, exchange_rate: f64) {
    ticker.current_price_usd = tick.last_price;
    ticker.current_price_local = tick.last_price * exchange_rate;
    if tick.quote_volume > 0.0 {
        ticker.quote_volume = tick.quote_volume;
    }
}

#[derive(Debug, Default)]
struct LiveState {
    tickers: Vec<Ticker>,
    last_update: Option<DateTime<Utc>>,
}

/// Process-wide live view. Fully replaced after a successful refetch,
/// patched per key by the stream.
pub struct LiveSnapshot {
    quote_asset: String,
    state: RwLock<LiveState>,
}

impl LiveSnapshot {
    pub fn new(quote_asset: impl Into<String>) -> Self {
        Self {
            quote_asset: quote_asset.into(),
            state: RwLock::new(LiveState::default()),
        }
    }

    pub async fn replace(&self, tickers: Vec<Ticker>) {
        let mut state = self.state.write().await;
        state.tickers = tickers;
        state.last_update = Some(Utc::now());
    }

    pub async fn apply_batch(&self, ticks: &[StreamTick], exchange_rate: f64) -> usize {
        let mut state = self.state.write().await;
        let patched = merge_ticks(&mut state.tickers, ticks, &self.quote_asset, exchange_rate);
        if patched > 0 {
            state.last_update = Some(Utc::now());
        }
        patched
    }

    pub async fn tickers(&self) -> Vec<Ticker> {
        self.state.read().await.tickers.clone()
    }

    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_update
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.tickers.is_empty()
    }
}
