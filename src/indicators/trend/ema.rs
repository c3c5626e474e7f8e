//! EMA (Exponential Moving Average) indicator

use crate::common::math;

/// EMA seeded with the SMA of the first `period` closes at index
/// `period - 1`; earlier positions are zero.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let mut ema = vec![0.0; closes.len()];
    ema[period - 1] = math::mean(&closes[..period]);

    for i in period..closes.len() {
        ema[i] = math::ema_from_previous(closes[i], ema[i - 1], period);
    }

    ema
}
