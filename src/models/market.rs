use serde::{Deserialize, Serialize};

/// Normalized crypto ticker. `symbol` is the lowercase base asset; the
/// exchange pair is recovered with [`Ticker::wire_symbol`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price_usd: f64,
    pub current_price_local: f64,
    pub price_change_percentage_24h: f64,
    pub volume_24h: f64,
    pub quote_volume: f64,
}

impl Ticker {
    /// Exchange-native pair symbol, e.g. `btc` + `USDT` -> `BTCUSDT`.
    pub fn wire_symbol(&self, quote_asset: &str) -> String {
        format!("{}{}", self.symbol.to_uppercase(), quote_asset.to_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityQuote {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub price_change_percentage_24h: f64,
}

/// One entry of a streaming ticker batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamTick {
    pub symbol: String,
    pub last_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volume: f64,
    pub quote_volume: f64,
}

/// Ordering applied to the crypto array of a snapshot response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Volume,
    Price,
    Gainers,
    Losers,
}

/// Sort a copy of `tickers` by `order` and keep at most `limit` entries.
pub fn sort_tickers(tickers: &[Ticker], order: Option<SortOrder>, limit: Option<usize>) -> Vec<Ticker> {
    let mut sorted = tickers.to_vec();
    match order {
        Some(SortOrder::Volume) => sorted.sort_by(|a, b| b.quote_volume.total_cmp(&a.quote_volume)),
        Some(SortOrder::Price) => {
            sorted.sort_by(|a, b| b.current_price_usd.total_cmp(&a.current_price_usd))
        }
        Some(SortOrder::Gainers) => sorted.sort_by(|a, b| {
            b.price_change_percentage_24h
                .total_cmp(&a.price_change_percentage_24h)
        }),
        Some(SortOrder::Losers) => sorted.sort_by(|a, b| {
            a.price_change_percentage_24h
                .total_cmp(&b.price_change_percentage_24h)
        }),
        None => {}
    }
    if let Some(limit) = limit {
        sorted.truncate(limit);
    }
    sorted
}
