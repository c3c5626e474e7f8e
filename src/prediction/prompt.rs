//! Prompt construction for the recommendation request.

use crate::models::prediction::TimeframeSnapshot;

pub const RECOMMENDATIONS: &[&str] = &["Strong Buy", "Buy", "Hold", "Sell", "Strong Sell", "No Trade"];
pub const TRENDS: &[&str] = &["Bullish", "Bearish", "Neutral", "Choppy"];

fn fmt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => "N/A".to_string(),
    }
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Natural-language request embedding both resolutions and the JSON output
/// contract.
pub fn build_prompt(
    symbol: &str,
    latest_price: f64,
    daily: &TimeframeSnapshot,
    four_hour: &TimeframeSnapshot,
) -> String {
    format!(
        r#"Analyze the {symbol} coin for investment purposes.
Use technical indicators and ICT (Inner Circle Trader) concepts.

Daily Data:
- Current Price: {price}
- RSI (14): {d_rsi}
- MACD (12, 26, 9): {d_macd} (signal {d_signal}, histogram {d_hist})
- EMA (20): {d_ema}

4-Hour Data:
- RSI (14): {h_rsi}
- MACD (12, 26, 9): {h_macd} (signal {h_signal}, histogram {h_hist})
- EMA (20): {h_ema}

Requirements:
1. Analyze the short-term (4h) and mid-term (Daily) trends.
2. Identify key ICT concepts such as Market Structure Shift (MSS), Order Blocks or Fair Value Gaps (FVG) where the price relation to the EMA suggests them.
3. Give a clear recommendation, one of: {recommendations}.
4. Classify the trend as one of: {trends}.
5. Give 3-4 short insights.
6. Estimate an entry price, a target price and a stop loss.
7. State your confidence as a number between 0 and 1.

Respond with a single JSON object and nothing else, using exactly these fields:
{{
  "recommendation": "Buy",
  "trend": "Bullish",
  "insights": ["...", "..."],
  "entryPrice": 0,
  "targetPrice": 0,
  "stopLoss": 0,
  "confidence": 0.8
}}
"#,
        symbol = symbol,
        price = latest_price,
        d_rsi = fmt(daily.rsi, 2),
        d_macd = fmt(daily.macd, 4),
        d_signal = fmt(daily.signal, 4),
        d_hist = fmt(daily.histogram, 4),
        d_ema = fmt(daily.ema20, 2),
        h_rsi = fmt(four_hour.rsi, 2),
        h_macd = fmt(four_hour.macd, 4),
        h_signal = fmt(four_hour.signal, 4),
        h_hist = fmt(four_hour.histogram, 4),
        h_ema = fmt(four_hour.ema20, 2),
        recommendations = quoted(RECOMMENDATIONS),
        trends = quoted(TRENDS),
    )
}
