//! Wiring of the concrete upstream clients, caches and streaming service.

use crate::cache::{Clock, PriceCache, SnapshotSource, SystemClock};
use crate::config::Config;
use crate::metrics::Metrics;
use crate::models::market::{EquityQuote, Ticker};
use crate::prediction::PredictionPipeline;
use crate::realtime::{LiveSnapshot, RealtimeMerger};
use crate::services::binance::{BinanceRestClient, BinanceStreamConnector};
use crate::services::coincap::CoinCapClient;
use crate::services::equities::{EquityFetcher, YahooQuoteClient};
use crate::services::exchange_rate::ExchangeRateService;
use crate::services::fetcher::MarketDataFetcher;
use crate::services::reasoning::{GeminiClient, ReasoningEngine};
use crate::services::websocket::WebSocketService;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Services {
    pub metrics: Arc<Metrics>,
    pub fetcher: Arc<MarketDataFetcher>,
    pub crypto_cache: Arc<PriceCache<Ticker>>,
    pub equity_cache: Arc<PriceCache<EquityQuote>>,
    pub live: Arc<LiveSnapshot>,
    pub pipeline: Arc<PredictionPipeline>,
    pub websocket: Arc<WebSocketService>,
}

impl Services {
    pub fn from_config(config: &Config, metrics: Arc<Metrics>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let quote = config.fetch.quote_asset.clone();

        let rates = Arc::new(
            ExchangeRateService::new(
                config.upstream.exchange_rate_url.clone(),
                config.fetch.local_currency.clone(),
                config.fetch.fallback_exchange_rate,
                config.fetch.exchange_rate_ttl,
                clock.clone(),
            )
            .with_metrics(metrics.clone()),
        );

        let binance = Arc::new(BinanceRestClient::new(
            config.upstream.binance_rest_url.clone(),
            quote.clone(),
        ));
        let coincap = Arc::new(CoinCapClient::new(config.upstream.coincap_url.clone(), quote.clone()));

        let fetcher = Arc::new(
            MarketDataFetcher::new(binance.clone(), coincap, rates.clone(), config.fetch.clone())
                .with_metrics(metrics.clone()),
        );
        let crypto_source: Arc<dyn SnapshotSource<Ticker>> = fetcher.clone();
        let crypto_cache = Arc::new(
            PriceCache::new("crypto", config.cache.crypto_ttl, clock.clone(), crypto_source)
                .with_metrics(metrics.clone()),
        );

        let equities: Arc<dyn SnapshotSource<EquityQuote>> = Arc::new(
            EquityFetcher::new(
                Arc::new(YahooQuoteClient::new(config.upstream.quote_api_url.clone())),
                config.equity_symbols.clone(),
            )
            .with_metrics(metrics.clone()),
        );
        let equity_cache = Arc::new(
            PriceCache::new("equity", config.cache.equity_ttl, clock, equities)
                .with_metrics(metrics.clone()),
        );

        let engine: Option<Arc<dyn ReasoningEngine>> = match config.reasoning.credential() {
            Some(key) => Some(Arc::new(GeminiClient::new(
                key,
                config.reasoning.model.clone(),
                config.reasoning.base_url.clone(),
            ))),
            None => {
                warn!("GEMINI_API_KEY is not set; prediction requests will be rejected");
                None
            }
        };
        let pipeline = Arc::new(PredictionPipeline::new(binance, engine));

        let live = Arc::new(LiveSnapshot::new(quote));
        let merger = RealtimeMerger::new(
            Arc::new(BinanceStreamConnector::new(config.upstream.binance_ws_url.clone())),
            live.clone(),
            rates,
            config.reconnect_delay,
        )
        .with_metrics(metrics.clone());
        let websocket = Arc::new(WebSocketService::new(merger));

        info!(
            quote_asset = %config.fetch.quote_asset,
            equities = config.equity_symbols.len(),
            "Services initialized"
        );

        Self {
            metrics,
            fetcher,
            crypto_cache,
            equity_cache,
            live,
            pipeline,
            websocket,
        }
    }
}
