//! Recommendation pipeline: candles, indicators, prompt, reasoning engine,
//! verdict.

pub mod parse;
pub mod prompt;

pub use parse::{extract_json_block, parse_analysis};
pub use prompt::build_prompt;

use crate::error::{Error, Result};
use crate::indicators::compute_indicator_set;
use crate::models::indicators::{closes, Candle, IndicatorParams, IndicatorSet};
use crate::models::prediction::{
    AiVerdict, PredictionResponse, PredictionResult, TechnicalSnapshot, TimeframeSnapshot,
};
use crate::services::market_data::CandleSource;
use crate::services::reasoning::ReasoningEngine;
use std::sync::Arc;
use tracing::{info, warn};

pub const DAILY_INTERVAL: &str = "1d";
pub const FOUR_HOUR_INTERVAL: &str = "4h";
pub const DEFAULT_CANDLE_LIMIT: usize = 50;
pub const CREDENTIAL_NAME: &str = "GEMINI_API_KEY";

const SNAPSHOT_EMA_PERIOD: usize = 20;

/// Latest values of the indicators the prompt and the response report.
pub fn timeframe_snapshot(set: &IndicatorSet) -> TimeframeSnapshot {
    TimeframeSnapshot {
        rsi: set.latest_rsi(),
        macd: set.latest_macd(),
        signal: set.latest_signal(),
        histogram: set.latest_histogram(),
        ema20: set.latest_ema(SNAPSHOT_EMA_PERIOD),
    }
}

pub struct PredictionPipeline {
    candles: Arc<dyn CandleSource>,
    engine: Option<Arc<dyn ReasoningEngine>>,
    params: IndicatorParams,
    candle_limit: usize,
}

impl PredictionPipeline {
    /// `engine` is `None` when no credential is configured; every request
    /// then fails with [`Error::CredentialMissing`] before touching the network.
    pub fn new(candles: Arc<dyn CandleSource>, engine: Option<Arc<dyn ReasoningEngine>>) -> Self {
        Self {
            candles,
            engine,
            params: IndicatorParams::default(),
            candle_limit: DEFAULT_CANDLE_LIMIT,
        }
    }

    pub fn with_candle_limit(mut self, limit: usize) -> Self {
        self.candle_limit = limit;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.engine.is_some()
    }

    pub async fn predict(&self, symbol: &str) -> Result<PredictionResponse> {
        let engine = self
            .engine
            .as_ref()
            .ok_or(Error::CredentialMissing(CREDENTIAL_NAME))?;
        let symbol = symbol.trim().to_uppercase();

        let (daily, four_hour) = tokio::try_join!(
            self.candles.get_candles(&symbol, DAILY_INTERVAL, self.candle_limit),
            self.candles.get_candles(&symbol, FOUR_HOUR_INTERVAL, self.candle_limit),
        )?;

        let latest_price = latest_close(&daily)
            .ok_or_else(|| Error::upstream(format!("no daily candles for {}", symbol)))?;

        let technical = TechnicalSnapshot {
            daily: timeframe_snapshot(&compute_indicator_set(&closes(&daily), &self.params)),
            four_hour: timeframe_snapshot(&compute_indicator_set(&closes(&four_hour), &self.params)),
        };

        let prompt = build_prompt(&symbol, latest_price, &technical.daily, &technical.four_hour);
        let text = engine.generate(&prompt).await?;

        let ai = match parse_analysis(&text) {
            Ok(analysis) => {
                info!(
                    symbol = %symbol,
                    provider = engine.provider(),
                    recommendation = %analysis.recommendation,
                    "Prediction generated"
                );
                AiVerdict::Parsed(PredictionResult::new(
                    symbol.clone(),
                    latest_price,
                    technical.clone(),
                    analysis,
                ))
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Could not parse reasoning engine response");
                AiVerdict::unparsed()
            }
        };

        Ok(PredictionResponse {
            symbol,
            latest_price,
            technical,
            ai,
        })
    }
}

fn latest_close(candles: &[Candle]) -> Option<f64> {
    candles.last().map(|c| c.close)
}
