//! Indicator engine: pure functions over close-price series.
//!
//! Every function returns a vector index-aligned with its input. Positions
//! before an indicator's warm-up are zero-filled, and an input too short for
//! the period yields an empty vector.

pub mod momentum;
pub mod trend;

pub use momentum::*;
pub use trend::*;

use crate::models::indicators::{IndicatorParams, IndicatorSet};
use std::collections::BTreeMap;

/// Compute the full indicator view for one series of closes.
pub fn compute_indicator_set(closes: &[f64], params: &IndicatorParams) -> IndicatorSet {
    let ema: BTreeMap<usize, Vec<f64>> = params
        .ema_periods
        .iter()
        .map(|&period| (period, calculate_ema(closes, period)))
        .collect();

    IndicatorSet {
        rsi: calculate_rsi(closes, params.rsi_period),
        ema,
        macd: calculate_macd(closes, params.macd_fast, params.macd_slow, params.macd_signal),
    }
}
