//! Prometheus metrics shared by the HTTP layer, the caches, the fetchers and
//! the streaming service.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    /// Labelled by cache name (`crypto`, `equity`).
    pub cache_hits_total: IntCounterVec,
    pub cache_misses_total: IntCounterVec,
    pub cache_stale_served_total: IntCounterVec,
    /// Labelled by upstream source (`binance`, `coincap`, `exchange_rate`, ...).
    pub upstream_failures_total: IntCounterVec,
    pub stream_ticks_applied_total: IntCounter,
    pub websocket_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let cache_hits_total = IntCounterVec::new(
            Opts::new("cache_hits_total", "Snapshot reads answered from a fresh cache entry"),
            &["cache"],
        )?;
        let cache_misses_total = IntCounterVec::new(
            Opts::new("cache_misses_total", "Snapshot reads that triggered a refetch"),
            &["cache"],
        )?;
        let cache_stale_served_total = IntCounterVec::new(
            Opts::new(
                "cache_stale_served_total",
                "Refetch failures answered with the previous snapshot",
            ),
            &["cache"],
        )?;
        let upstream_failures_total = IntCounterVec::new(
            Opts::new("upstream_failures_total", "Failed upstream fetch attempts"),
            &["source"],
        )?;
        let stream_ticks_applied_total = IntCounter::new(
            "stream_ticks_applied_total",
            "Streaming ticks merged into the live snapshot",
        )?;
        let websocket_connected = Gauge::new(
            "websocket_connected",
            "1 when the streaming ticker feed is connected",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(cache_stale_served_total.clone()))?;
        registry.register(Box::new(upstream_failures_total.clone()))?;
        registry.register(Box::new(stream_ticks_applied_total.clone()))?;
        registry.register(Box::new(websocket_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            cache_hits_total,
            cache_misses_total,
            cache_stale_served_total,
            upstream_failures_total,
            stream_ticks_applied_total,
            websocket_connected,
        })
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
