//! Integration tests for equity quotes and their fallbacks.

use marketlens::services::equities::{static_fallback_quotes, EquityFetcher, YahooQuoteClient};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn fetcher(server: &MockServer, list: &[&str]) -> EquityFetcher {
    EquityFetcher::new(Arc::new(YahooQuoteClient::new(server.uri())), symbols(list))
}

#[tokio::test]
async fn batch_quotes_are_returned_in_configured_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .and(query_param("symbols", "005930.KS,000660.KS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteResponse": {"result": [
                {"symbol": "000660.KS", "shortName": "SK hynix", "regularMarketPrice": 150000.0, "regularMarketChangePercent": 1.5},
                {"symbol": "005930.KS", "shortName": "Samsung", "regularMarketPrice": 80000.0, "regularMarketChangePercent": -0.5}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let quotes = fetcher(&server, &["005930.KS", "000660.KS"]).fetch_equity_quotes().await;

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].symbol, "005930.KS");
    assert_eq!(quotes[0].current_price, 80000.0);
    assert_eq!(quotes[1].name, "SK hynix");
}

#[tokio::test]
async fn missing_symbols_use_chart_then_static_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/005930.KS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {"result": [{"meta": {"symbol": "005930.KS", "regularMarketPrice": 81000.0, "chartPreviousClose": 80000.0}}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/000660.KS"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/UNKNOWN.KS"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let quotes = fetcher(&server, &["005930.KS", "000660.KS", "UNKNOWN.KS"])
        .fetch_equity_quotes()
        .await;

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].current_price, 81000.0);
    assert!((quotes[0].price_change_percentage_24h - 1.25).abs() < 1e-9);

    let fallback = static_fallback_quotes()
        .into_iter()
        .find(|q| q.symbol == "000660.KS")
        .unwrap();
    assert_eq!(quotes[1], fallback);
}

#[tokio::test]
async fn no_configured_symbols_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(fetcher(&server, &[]).fetch_equity_quotes().await.is_empty());
}
