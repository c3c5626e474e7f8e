//! Upstream clients and the fetchers built on them.

pub mod binance;
pub mod coincap;
pub mod equities;
pub mod exchange_rate;
pub mod fetcher;
pub mod market_data;
pub mod normalize;
pub mod reasoning;
pub mod websocket;

pub use equities::{EquityFetcher, QuoteProvider, YahooQuoteClient};
pub use exchange_rate::ExchangeRateService;
pub use fetcher::MarketDataFetcher;
pub use market_data::{CandleSource, RawTicker, TickerSource};
pub use reasoning::{GeminiClient, ReasoningEngine};
