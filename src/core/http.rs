//! HTTP endpoint server using Axum

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, RwLock};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::cache::PriceCache;
use crate::config::Config;
use crate::core::bootstrap::Services;
use crate::error::Error;
use crate::metrics::Metrics;
use crate::models::market::{sort_tickers, EquityQuote, SortOrder, Ticker};
use crate::prediction::PredictionPipeline;
use crate::realtime::{ConnectionState, LiveSnapshot};

pub const STALE_MESSAGE: &str = "Using cached data";

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub crypto_cache: Arc<PriceCache<Ticker>>,
    pub equity_cache: Arc<PriceCache<EquityQuote>>,
    pub live: Arc<LiveSnapshot>,
    pub stream_status: watch::Receiver<ConnectionState>,
    pub pipeline: Arc<PredictionPipeline>,
    pub default_symbol: String,
}

impl AppState {
    pub fn from_services(services: &Services, default_symbol: impl Into<String>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: services.metrics.clone(),
            start_time: Arc::new(Instant::now()),
            crypto_cache: services.crypto_cache.clone(),
            equity_cache: services.equity_cache.clone(),
            live: services.live.clone(),
            stream_status: services.websocket.merger().subscribe_status(),
            pipeline: services.pipeline.clone(),
            default_symbol: default_symbol.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Tagged error payload: `{"error": <tag>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    tag: &'static str,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::CredentialMissing(name) => Self {
                status: StatusCode::UNAUTHORIZED,
                tag: "API_KEY_REQUIRED",
                message: format!("{} is not configured", name),
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                tag: "FAILED_TO_ANALYZE",
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.tag, "message": self.message })),
        )
            .into_response()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "marketlens-api"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Default, Deserialize)]
pub struct PricesQuery {
    pub sort: Option<SortOrder>,
    pub limit: Option<usize>,
}

/// Crypto and equity snapshots through their caches.
///
/// Only a crypto fetch failure with nothing cached answers 500.
async fn get_prices(
    State(state): State<AppState>,
    Query(params): Query<PricesQuery>,
) -> (StatusCode, Json<Value>) {
    let (crypto, stocks) = tokio::join!(state.crypto_cache.get(), state.equity_cache.get());

    if crypto.is_empty() {
        error!("Crypto snapshot unavailable and nothing cached");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "crypto": [], "stocks": stocks.data })),
        );
    }

    if !crypto.cached {
        state.live.replace(crypto.data.clone()).await;
    }

    let tickers = sort_tickers(&crypto.data, params.sort, params.limit);
    let mut body = Map::new();
    body.insert("crypto".into(), json!(tickers));
    body.insert("stocks".into(), json!(stocks.data));
    body.insert("cached".into(), json!(crypto.cached));
    if let Some(age) = crypto.age_seconds {
        body.insert("cacheAge".into(), json!(age));
    }
    if crypto.stale {
        body.insert("stale".into(), json!(true));
        body.insert("error".into(), json!(STALE_MESSAGE));
    }

    (StatusCode::OK, Json(Value::Object(body)))
}

/// The stream-patched snapshot. Seeds it through the crypto cache when the
/// stream has nothing to patch yet.
async fn get_live_prices(State(state): State<AppState>) -> Json<Value> {
    if state.live.is_empty().await {
        let crypto = state.crypto_cache.get().await;
        if !crypto.is_empty() {
            state.live.replace(crypto.data).await;
        } else {
            warn!("Live snapshot requested before any crypto data was available");
        }
    }

    let status = *state.stream_status.borrow();
    let mut body = Map::new();
    body.insert("crypto".into(), json!(state.live.tickers().await));
    body.insert("status".into(), json!(status));
    if let Some(updated) = state.live.last_update().await {
        body.insert("lastUpdate".into(), json!(updated.to_rfc3339()));
    }
    Json(Value::Object(body))
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub symbol: Option<String>,
}

async fn predict(
    State(state): State<AppState>,
    Query(params): Query<PredictQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = params
        .symbol
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.default_symbol.clone());

    let response = state.pipeline.predict(&symbol).await.map_err(|e| {
        match &e {
            Error::CredentialMissing(_) => warn!(symbol = %symbol, "Prediction rejected, credential missing"),
            _ => error!(symbol = %symbol, error = %e, "Prediction failed"),
        }
        ApiError::from(e)
    })?;

    Ok(Json(json!(response)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/prices", get(get_prices))
        .route("/api/prices/live", get(get_live_prices))
        .route("/api/ai/predict", get(predict))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let services = Services::from_config(&config, metrics);

    if config.realtime_enabled {
        services.websocket.start().await;
    } else {
        info!("Realtime stream disabled");
    }

    let state = AppState::from_services(&services, config.default_symbol.clone());
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    let served = axum::serve(listener, app).await;
    services.websocket.stop().await;
    served?;

    Ok(())
}
