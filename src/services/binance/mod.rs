//! Binance spot market data (primary ticker source, klines, live stream).

pub mod messages;
pub mod rest;
pub mod stream;

pub use messages::{parse_kline, parse_mini_ticker_batch, MiniTicker, Ticker24h};
pub use rest::BinanceRestClient;
pub use stream::BinanceStreamConnector;
