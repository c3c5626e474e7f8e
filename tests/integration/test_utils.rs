//! Shared fixtures for integration tests: upstream payloads and fakes.

#![allow(dead_code)]

use async_trait::async_trait;
use marketlens::cache::SystemClock;
use marketlens::error::{Error, Result};
use marketlens::models::indicators::Candle;
use marketlens::services::exchange_rate::ExchangeRateService;
use marketlens::services::market_data::CandleSource;
use marketlens::services::reasoning::ReasoningEngine;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VERDICT_JSON: &str = r#"{"recommendation":"Buy","trend":"Bullish","insights":["Higher lows","MACD above signal","Price above EMA20"],"entryPrice":50000,"targetPrice":56000,"stopLoss":47500,"confidence":0.7}"#;

pub fn binance_24hr_body() -> Value {
    json!([
        {"symbol": "BTCUSDT", "lastPrice": "50000.00", "priceChangePercent": "2.50", "volume": "1000", "quoteVolume": "50000000"},
        {"symbol": "ETHUSDT", "lastPrice": "3000.00", "priceChangePercent": "-1.20", "volume": "20000", "quoteVolume": "60000000"},
        {"symbol": "USDCUSDT", "lastPrice": "1.00", "priceChangePercent": "0.00", "volume": "1", "quoteVolume": "1"},
        {"symbol": "ETHBTC", "lastPrice": "0.06", "priceChangePercent": "0.10", "volume": "5", "quoteVolume": "0.3"}
    ])
}

pub fn coincap_body() -> Value {
    json!({
        "data": [
            {"symbol": "BTC", "name": "Bitcoin", "priceUsd": "49900.5", "changePercent24Hr": "1.1", "volumeUsd24Hr": "123456"},
            {"symbol": "SOL", "name": "Solana", "priceUsd": "150.25", "changePercent24Hr": "-3.3", "volumeUsd24Hr": "6543"}
        ]
    })
}

pub fn rates_body(rate: f64) -> Value {
    json!({"result": "success", "base_code": "USD", "rates": {"USD": 1.0, "KRW": rate}})
}

/// Kline rows with steadily rising closes, one hour apart, times in ms.
pub fn kline_rows(count: usize, start_price: f64) -> Value {
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            let close = start_price + i as f64 * 10.0;
            json!([
                1_700_000_000_000i64 + i as i64 * 3_600_000,
                format!("{:.2}", close - 5.0),
                format!("{:.2}", close + 20.0),
                format!("{:.2}", close - 20.0),
                format!("{:.2}", close),
                "12.5",
                1_700_000_000_000i64 + i as i64 * 3_600_000 + 3_599_999
            ])
        })
        .collect();
    Value::Array(rows)
}

pub fn gemini_body(text: &str) -> Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
}

pub async fn mock_exchange_rate(server: &MockServer, rate: f64) {
    Mock::given(method("GET"))
        .and(path("/v6/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates_body(rate)))
        .mount(server)
        .await;
}

pub fn rate_service(server: &MockServer) -> Arc<ExchangeRateService> {
    Arc::new(ExchangeRateService::new(
        format!("{}/v6/latest/USD", server.uri()),
        "KRW",
        1350.0,
        Duration::from_secs(3600),
        Arc::new(SystemClock),
    ))
}

pub fn rising_candles(count: usize, start_price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = start_price + i as f64 * 10.0;
            Candle::new(1_700_000_000 + i as i64 * 3600, close - 5.0, close + 20.0, close - 20.0, close, 12.5)
        })
        .collect()
}

/// Candle source serving fixed candles, or failing when `fail` is set.
pub struct FakeCandles {
    pub fail: bool,
    pub calls: AtomicUsize,
    pub intervals: Mutex<Vec<String>>,
}

impl FakeCandles {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
            intervals: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
            intervals: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandleSource for FakeCandles {
    async fn get_candles(&self, _symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.intervals.lock().unwrap().push(interval.to_string());
        if self.fail {
            return Err(Error::upstream("candle source offline"));
        }
        let start = if interval == "1d" { 40_000.0 } else { 49_000.0 };
        Ok(rising_candles(limit, start))
    }
}

/// Reasoning engine answering with a fixed text, or failing.
pub struct FakeEngine {
    pub reply: Result<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(Error::upstream("model overloaded")),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ReasoningEngine for FakeEngine {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }

    fn provider(&self) -> &str {
        "fake"
    }
}
