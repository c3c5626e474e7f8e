//! Binance REST and stream payloads.

use crate::models::indicators::Candle;
use crate::models::market::StreamTick;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entry of `GET /api/v3/ticker/24hr`. Numbers arrive as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    pub last_price: String,
    pub price_change_percent: String,
    pub volume: String,
    pub quote_volume: String,
}

/// Entry of the `!miniTicker@arr` stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiniTicker {
    #[serde(rename = "e", default)]
    pub event_type: String,
    #[serde(rename = "E", default)]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "o", default)]
    pub open: String,
    #[serde(rename = "h", default)]
    pub high: String,
    #[serde(rename = "l", default)]
    pub low: String,
    #[serde(rename = "v", default)]
    pub volume: String,
    #[serde(rename = "q", default)]
    pub quote_volume: String,
}

fn parse_or_zero(value: &str) -> f64 {
    value.parse().unwrap_or(0.0)
}

impl MiniTicker {
    /// Convert to a [`StreamTick`]; `None` if the close price is unusable.
    pub fn to_tick(&self) -> Option<StreamTick> {
        let last_price: f64 = self.close.parse().ok()?;
        if !last_price.is_finite() {
            return None;
        }
        Some(StreamTick {
            symbol: self.symbol.clone(),
            last_price,
            open_price: parse_or_zero(&self.open),
            high_price: parse_or_zero(&self.high),
            low_price: parse_or_zero(&self.low),
            volume: parse_or_zero(&self.volume),
            quote_volume: parse_or_zero(&self.quote_volume),
        })
    }
}

/// Parse one stream frame. Frames that are not ticker arrays yield an empty batch.
pub fn parse_mini_ticker_batch(text: &str) -> serde_json::Result<Vec<StreamTick>> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_array() {
        return Ok(Vec::new());
    }
    let tickers: Vec<MiniTicker> = serde_json::from_value(value)?;
    Ok(tickers.iter().filter_map(MiniTicker::to_tick).collect())
}

fn number_at(row: &[Value], index: usize) -> Option<f64> {
    match row.get(index)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Kline row `[openTime(ms), open, high, low, close, volume, ...]`.
pub fn parse_kline(row: &[Value]) -> Option<Candle> {
    let open_time_ms = row.first()?.as_i64()?;
    Some(Candle::new(
        open_time_ms / 1000,
        number_at(row, 1)?,
        number_at(row, 2)?,
        number_at(row, 3)?,
        number_at(row, 4)?,
        number_at(row, 5)?,
    ))
}
