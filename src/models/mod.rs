//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod market;
pub mod prediction;

pub use indicators::{closes, Candle, IndicatorParams, IndicatorSet, MacdSeries};
pub use market::{sort_tickers, EquityQuote, SortOrder, StreamTick, Ticker};
pub use prediction::{
    AiAnalysis, AiVerdict, PredictionResponse, PredictionResult, TechnicalSnapshot,
    TimeframeSnapshot,
};
