//! Integration tests for the recommendation pipeline.

use super::test_utils::*;
use marketlens::error::Error;
use marketlens::models::prediction::{AiVerdict, PARSE_FAILURE_MESSAGE};
use marketlens::prediction::PredictionPipeline;
use marketlens::services::binance::BinanceRestClient;
use marketlens::services::reasoning::{GeminiClient, ReasoningEngine};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_klines(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1d"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kline_rows(50, 40_000.0)))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "4h"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kline_rows(50, 49_000.0)))
        .expect(1)
        .mount(server)
        .await;
}

fn gemini(server: &MockServer) -> Arc<dyn ReasoningEngine> {
    Arc::new(GeminiClient::new("test-key", "gemini-flash-latest", server.uri()))
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let binance = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&binance)
        .await;

    let pipeline = PredictionPipeline::new(Arc::new(BinanceRestClient::new(binance.uri(), "USDT")), None);
    let err = pipeline.predict("BTC").await.unwrap_err();
    assert_eq!(err, Error::CredentialMissing("GEMINI_API_KEY"));
    assert!(!pipeline.has_credential());
}

#[tokio::test]
async fn full_pipeline_against_mocked_upstreams() {
    let binance = MockServer::start().await;
    mock_klines(&binance).await;

    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-flash-latest:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_string_contains("Analyze the BTC coin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(&format!(
            "Here is the analysis:\n```json\n{}\n```",
            VERDICT_JSON
        ))))
        .expect(1)
        .mount(&model)
        .await;

    let pipeline = PredictionPipeline::new(
        Arc::new(BinanceRestClient::new(binance.uri(), "USDT")),
        Some(gemini(&model)),
    );
    let response = pipeline.predict("btc").await.unwrap();

    assert_eq!(response.symbol, "BTC");
    assert_eq!(response.latest_price, 40_000.0 + 49.0 * 10.0);
    let daily = &response.technical.daily;
    assert!(daily.rsi.unwrap() > 0.0 && daily.rsi.unwrap() <= 100.0);
    assert!(daily.ema20.is_some());
    assert!(daily.macd.unwrap() > 0.0);

    let result = response.ai.parsed().expect("verdict should parse");
    assert_eq!(result.recommendation, "Buy");
    assert_eq!(result.insights.len(), 3);
    assert_eq!(result.latest_price, response.latest_price);
    assert_eq!(result.technical, response.technical);
}

#[tokio::test]
async fn unparseable_model_output_is_reported_in_band() {
    let engine = FakeEngine::replying("I am unable to produce a recommendation today.");
    let pipeline = PredictionPipeline::new(FakeCandles::new(), Some(engine.clone()));

    let response = pipeline.predict("ETH").await.unwrap();
    assert_eq!(
        response.ai,
        AiVerdict::Unparsed {
            error: PARSE_FAILURE_MESSAGE.to_string()
        }
    );
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["ai"]["error"], PARSE_FAILURE_MESSAGE);
    assert_eq!(engine.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn both_timeframes_are_fetched() {
    let candles = FakeCandles::new();
    let pipeline = PredictionPipeline::new(candles.clone(), Some(FakeEngine::replying(VERDICT_JSON)));

    pipeline.predict("SOL").await.unwrap();

    let mut intervals = candles.intervals.lock().unwrap().clone();
    intervals.sort();
    assert_eq!(intervals, vec!["1d".to_string(), "4h".to_string()]);
}

#[tokio::test]
async fn candle_failure_is_a_pipeline_error() {
    let engine = FakeEngine::replying(VERDICT_JSON);
    let pipeline = PredictionPipeline::new(FakeCandles::failing(), Some(engine.clone()));

    let err = pipeline.predict("BTC").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(_)));
    assert!(engine.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn model_http_error_is_upstream_unavailable() {
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&model)
        .await;

    let pipeline = PredictionPipeline::new(FakeCandles::new(), Some(gemini(&model)));
    let err = pipeline.predict("BTC").await.unwrap_err();
    match err {
        Error::UpstreamUnavailable(message) => assert!(message.contains("overloaded")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn empty_model_candidates_are_malformed() {
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})))
        .mount(&model)
        .await;

    let pipeline = PredictionPipeline::new(FakeCandles::new(), Some(gemini(&model)));
    let err = pipeline.predict("BTC").await.unwrap_err();
    assert!(matches!(err, Error::MalformedUpstreamResponse(_)));
}

#[tokio::test]
async fn api_key_travels_in_header_not_url() {
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(VERDICT_JSON)))
        .expect(1)
        .mount(&model)
        .await;

    let pipeline = PredictionPipeline::new(FakeCandles::new(), Some(gemini(&model)));
    pipeline.predict("BTC").await.unwrap();

    let requests = model.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.as_str().contains("test-key"));
    assert_eq!(requests[0].headers.get("x-goog-api-key").unwrap(), "test-key");
}

#[tokio::test]
async fn unreachable_model_error_does_not_expose_api_key() {
    let engine: Arc<dyn ReasoningEngine> = Arc::new(GeminiClient::new(
        "SECRET-GEMINI-KEY",
        "gemini-flash-latest",
        "http://127.0.0.1:1",
    ));
    let pipeline = PredictionPipeline::new(FakeCandles::new(), Some(engine));

    let err = pipeline.predict("BTC").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(_)));
    assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
    assert!(!err.to_string().contains("127.0.0.1"));
}
