use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One OHLCV bar. `time` is seconds since the epoch (bar open).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

/// Close prices of a series, in order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// MACD line, signal line and histogram, index-aligned with the input closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdSeries {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub ema_periods: Vec<usize>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_periods: vec![20],
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

/// Read-only indicator view derived from one series. Recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Vec<f64>,
    pub ema: BTreeMap<usize, Vec<f64>>,
    pub macd: MacdSeries,
}

impl IndicatorSet {
    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi.last().copied()
    }

    pub fn latest_ema(&self, period: usize) -> Option<f64> {
        self.ema.get(&period).and_then(|series| series.last().copied())
    }

    pub fn latest_macd(&self) -> Option<f64> {
        self.macd.macd_line.last().copied()
    }

    pub fn latest_signal(&self) -> Option<f64> {
        self.macd.signal_line.last().copied()
    }

    pub fn latest_histogram(&self) -> Option<f64> {
        self.macd.histogram.last().copied()
    }
}
