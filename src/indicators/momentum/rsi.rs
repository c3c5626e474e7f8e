//! RSI (Relative Strength Index) indicator

use crate::common::math;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Wilder-smoothed RSI.
///
/// The first value sits at index `period` and uses the simple average of the
/// first `period` deltas; later values use Wilder smoothing. A zero average
/// loss is replaced by `1` in the denominator, so a series without losses
/// saturates towards 100 instead of dividing by zero.
///
/// Returns an empty vector when `closes.len() <= period`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let mut rsi = vec![0.0; closes.len()];
    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in 1..=period {
        let diff = closes[i] - closes[i - 1];
        if diff >= 0.0 {
            gains += diff;
        } else {
            losses -= diff;
        }
    }

    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;
    rsi[period] = rsi_value(avg_gain, avg_loss);

    for i in (period + 1)..closes.len() {
        let diff = closes[i] - closes[i - 1];
        let gain = if diff >= 0.0 { diff } else { 0.0 };
        let loss = if diff < 0.0 { -diff } else { 0.0 };

        avg_gain = math::wilder_step(avg_gain, gain, period);
        avg_loss = math::wilder_step(avg_loss, loss, period);
        rsi[i] = rsi_value(avg_gain, avg_loss);
    }

    rsi
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let denominator = if avg_loss == 0.0 { 1.0 } else { avg_loss };
    100.0 - (100.0 / (1.0 + avg_gain / denominator))
}

/// RSI with the default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> Vec<f64> {
    calculate_rsi(closes, DEFAULT_RSI_PERIOD)
}
