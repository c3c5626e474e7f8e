//! Environment-driven configuration.
//!
//! Binaries call `dotenvy::dotenv()` first, then [`Config::from_env`].
//! Every value has a default so the API server starts with an empty
//! environment; malformed numbers fall back to the default.

use std::env;
use std::time::Duration;

/// Placeholder shipped in sample `.env` files; treated as "not configured".
pub const API_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn list_or(name: &str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = env::var(name)
        .ok()
        .map(|s| {
            s.split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}

/// Upstream endpoints.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub binance_rest_url: String,
    pub binance_ws_url: String,
    pub coincap_url: String,
    pub exchange_rate_url: String,
    pub quote_api_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            binance_rest_url: "https://api.binance.com".to_string(),
            binance_ws_url: "wss://stream.binance.com:9443/ws/!miniTicker@arr".to_string(),
            coincap_url: "https://api.coincap.io".to_string(),
            exchange_rate_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            quote_api_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }
}

/// Crypto fetch and normalization settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub quote_asset: String,
    pub local_currency: String,
    pub fallback_exchange_rate: f64,
    pub exchange_rate_ttl: Duration,
    /// Total attempts against the primary source, including the first.
    pub retry_attempts: usize,
    pub retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            local_currency: "KRW".to_string(),
            fallback_exchange_rate: 1350.0,
            exchange_rate_ttl: Duration::from_secs(3600),
            retry_attempts: 2,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub crypto_ttl: Duration,
    pub equity_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            crypto_ttl: Duration::from_secs(15),
            equity_ttl: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-flash-latest".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl ReasoningConfig {
    /// The configured key, unless it is absent, blank or the sample placeholder.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != API_KEY_PLACEHOLDER)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub default_symbol: String,
    pub equity_symbols: Vec<String>,
    pub realtime_enabled: bool,
    pub reconnect_delay: Duration,
    pub upstream: UpstreamConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub reasoning: ReasoningConfig,
}

pub const DEFAULT_EQUITY_SYMBOLS: &[&str] = &[
    "005930.KS",
    "000660.KS",
    "373220.KS",
    "005380.KS",
    "035420.KS",
    "035720.KS",
];

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            default_symbol: "BTC".to_string(),
            equity_symbols: DEFAULT_EQUITY_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            realtime_enabled: true,
            reconnect_delay: Duration::from_millis(3000),
            upstream: UpstreamConfig::default(),
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
            reasoning: ReasoningConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let upstream = UpstreamConfig {
            binance_rest_url: var_or("BINANCE_REST_URL", &defaults.upstream.binance_rest_url),
            binance_ws_url: var_or("BINANCE_WS_URL", &defaults.upstream.binance_ws_url),
            coincap_url: var_or("COINCAP_URL", &defaults.upstream.coincap_url),
            exchange_rate_url: var_or("EXCHANGE_RATE_URL", &defaults.upstream.exchange_rate_url),
            quote_api_url: var_or("QUOTE_API_URL", &defaults.upstream.quote_api_url),
        };

        let fetch = FetchConfig {
            quote_asset: var_or("QUOTE_ASSET", &defaults.fetch.quote_asset).to_uppercase(),
            local_currency: var_or("LOCAL_CURRENCY", &defaults.fetch.local_currency)
                .to_uppercase(),
            fallback_exchange_rate: parse_or(
                "FALLBACK_EXCHANGE_RATE",
                defaults.fetch.fallback_exchange_rate,
            ),
            exchange_rate_ttl: Duration::from_secs(parse_or("EXCHANGE_RATE_TTL_SECS", 3600)),
            retry_attempts: parse_or("FETCH_RETRY_ATTEMPTS", defaults.fetch.retry_attempts)
                .max(1),
            retry_delay: Duration::from_millis(parse_or("FETCH_RETRY_DELAY_MS", 1000)),
        };

        let cache = CacheConfig {
            crypto_ttl: Duration::from_secs(parse_or("CRYPTO_CACHE_TTL_SECS", 15)),
            equity_ttl: Duration::from_secs(parse_or("EQUITY_CACHE_TTL_SECS", 60)),
        };

        let reasoning = ReasoningConfig {
            api_key: env::var("GEMINI_API_KEY").ok(),
            model: var_or("GEMINI_MODEL", &defaults.reasoning.model),
            base_url: var_or("GEMINI_BASE_URL", &defaults.reasoning.base_url),
        };

        Self {
            port: parse_or("PORT", defaults.port),
            default_symbol: var_or("DEFAULT_SYMBOL", &defaults.default_symbol).to_uppercase(),
            equity_symbols: list_or("EQUITY_SYMBOLS", DEFAULT_EQUITY_SYMBOLS),
            realtime_enabled: parse_or("REALTIME_ENABLED", true),
            reconnect_delay: Duration::from_millis(parse_or("STREAM_RECONNECT_DELAY_MS", 3000)),
            upstream,
            fetch,
            cache,
            reasoning,
        }
    }
}
