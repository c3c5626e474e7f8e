//! SMA (Simple Moving Average) indicator

use crate::common::math;

/// Windowed average; positions before `period - 1` are zero.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let mut sma = vec![0.0; closes.len()];
    for i in (period - 1)..closes.len() {
        sma[i] = math::mean(&closes[i + 1 - period..=i]);
    }
    sma
}
