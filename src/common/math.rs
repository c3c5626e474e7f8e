//! Numeric helpers for the indicator engine.

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// EMA smoothing factor `k = 2 / (period + 1)`.
pub fn ema_multiplier(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// One EMA step from the previous value.
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let k = ema_multiplier(period);
    value * k + previous * (1.0 - k)
}

/// Wilder smoothing step: `(previous * (period - 1) + value) / period`.
pub fn wilder_step(previous: f64, value: f64, period: usize) -> f64 {
    (previous * (period as f64 - 1.0) + value) / period as f64
}
