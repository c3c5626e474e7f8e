//! Unit tests for snapshot sorting

use marketlens::models::market::{sort_tickers, SortOrder, Ticker};

fn ticker(symbol: &str, price: f64, change: f64, quote_volume: f64) -> Ticker {
    Ticker {
        id: symbol.to_string(),
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        current_price_usd: price,
        current_price_local: price,
        price_change_percentage_24h: change,
        volume_24h: 1.0,
        quote_volume,
    }
}

fn symbols(tickers: &[Ticker]) -> Vec<&str> {
    tickers.iter().map(|t| t.symbol.as_str()).collect()
}

fn sample() -> Vec<Ticker> {
    vec![
        ticker("a", 10.0, -2.0, 300.0),
        ticker("b", 30.0, 5.0, 100.0),
        ticker("c", 20.0, 1.0, 200.0),
    ]
}

#[test]
fn test_sort_orders() {
    let tickers = sample();
    assert_eq!(symbols(&sort_tickers(&tickers, Some(SortOrder::Volume), None)), vec!["a", "c", "b"]);
    assert_eq!(symbols(&sort_tickers(&tickers, Some(SortOrder::Price), None)), vec!["b", "c", "a"]);
    assert_eq!(symbols(&sort_tickers(&tickers, Some(SortOrder::Gainers), None)), vec!["b", "c", "a"]);
    assert_eq!(symbols(&sort_tickers(&tickers, Some(SortOrder::Losers), None)), vec!["a", "c", "b"]);
}

#[test]
fn test_unsorted_keeps_upstream_order_and_limits() {
    let tickers = sample();
    assert_eq!(symbols(&sort_tickers(&tickers, None, Some(2))), vec!["a", "b"]);
    assert_eq!(sort_tickers(&tickers, None, Some(10)).len(), 3);
}

#[test]
fn test_sort_order_parses_lowercase() {
    let order: SortOrder = serde_json::from_str("\"gainers\"").unwrap();
    assert_eq!(order, SortOrder::Gainers);
}
