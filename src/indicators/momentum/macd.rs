//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::trend::calculate_ema;
use crate::models::indicators::MacdSeries;

/// MACD over zero-filled EMAs.
///
/// `macd_line[i] = ema_fast[i] - ema_slow[i]` for every index, including the
/// warm-up where the EMAs are zero. The signal line is the EMA of the MACD
/// tail starting at `slow - 1`, shifted right by `slow - 1 + signal - 1` and
/// zero-filled elsewhere; values shifted past the end are dropped. This
/// alignment is approximate for the first `slow + signal` bars and callers
/// index into it as-is.
///
/// Returns empty vectors when the series is shorter than `slow`.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    if fast == 0 || slow == 0 || signal == 0 || closes.len() < slow || closes.len() < fast {
        return MacdSeries::default();
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let tail_signal = calculate_ema(&macd_line[slow - 1..], signal);
    let offset = slow - 1 + signal - 1;
    let mut signal_line = vec![0.0; macd_line.len()];
    for (i, value) in tail_signal.iter().enumerate() {
        match signal_line.get_mut(i + offset) {
            Some(slot) => *slot = *value,
            None => break,
        }
    }

    let histogram = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd_line,
        signal_line,
        histogram,
    }
}

/// MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(closes: &[f64]) -> MacdSeries {
    calculate_macd(closes, 12, 26, 9)
}
