//! Unit tests for prompt construction

use marketlens::models::prediction::TimeframeSnapshot;
use marketlens::prediction::prompt::{build_prompt, RECOMMENDATIONS, TRENDS};

fn snapshot(rsi: Option<f64>) -> TimeframeSnapshot {
    TimeframeSnapshot {
        rsi,
        macd: Some(12.345678),
        signal: Some(10.0),
        histogram: Some(2.345678),
        ema20: Some(49_876.123),
    }
}

#[test]
fn test_prompt_embeds_both_timeframes() {
    let prompt = build_prompt("BTC", 50_000.5, &snapshot(Some(61.234)), &snapshot(Some(48.0)));
    assert!(prompt.contains("BTC"));
    assert!(prompt.contains("50000.5"));
    assert!(prompt.contains("RSI (14): 61.23"));
    assert!(prompt.contains("RSI (14): 48.00"));
    assert!(prompt.contains("12.3457"));
    assert!(prompt.contains("49876.12"));
}

#[test]
fn test_prompt_states_output_contract() {
    let prompt = build_prompt("ETH", 3000.0, &snapshot(None), &snapshot(None));
    for field in ["recommendation", "trend", "insights", "entryPrice", "targetPrice", "stopLoss", "confidence"] {
        assert!(prompt.contains(field), "missing {}", field);
    }
    for value in RECOMMENDATIONS.iter().chain(TRENDS.iter()) {
        assert!(prompt.contains(value), "missing {}", value);
    }
    assert!(prompt.contains("N/A"));
}
