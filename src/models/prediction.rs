use serde::{Deserialize, Serialize};

/// Latest indicator values for one candle resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
    pub ema20: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub daily: TimeframeSnapshot,
    pub four_hour: TimeframeSnapshot,
}

/// The JSON object the reasoning engine is asked to produce. Values are not
/// range-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub recommendation: String,
    pub trend: String,
    pub insights: Vec<String>,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub symbol: String,
    pub latest_price: f64,
    pub technical: TechnicalSnapshot,
    pub recommendation: String,
    pub trend: String,
    pub insights: Vec<String>,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub confidence: f64,
}

impl PredictionResult {
    pub fn new(symbol: String, latest_price: f64, technical: TechnicalSnapshot, analysis: AiAnalysis) -> Self {
        Self {
            symbol,
            latest_price,
            technical,
            recommendation: analysis.recommendation,
            trend: analysis.trend,
            insights: analysis.insights,
            entry_price: analysis.entry_price,
            target_price: analysis.target_price,
            stop_loss: analysis.stop_loss,
            confidence: analysis.confidence,
        }
    }
}

pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse AI response";

/// Either a parsed verdict or the degraded "could not parse" marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiVerdict {
    Parsed(PredictionResult),
    Unparsed { error: String },
}

impl AiVerdict {
    pub fn unparsed() -> Self {
        AiVerdict::Unparsed {
            error: PARSE_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn parsed(&self) -> Option<&PredictionResult> {
        match self {
            AiVerdict::Parsed(result) => Some(result),
            AiVerdict::Unparsed { .. } => None,
        }
    }
}

/// Body of a successful recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub symbol: String,
    pub latest_price: f64,
    pub technical: TechnicalSnapshot,
    pub ai: AiVerdict,
}
