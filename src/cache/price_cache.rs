//! Short-TTL snapshot cache between client polling and upstream rate limits.

use super::clock::{elapsed_millis, Clock};
use crate::metrics::Metrics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Produces a full snapshot. An empty vector means the fetch failed.
#[async_trait]
pub trait SnapshotSource<T>: Send + Sync {
    async fn fetch_snapshot(&self) -> Vec<T>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: Vec<T>,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of [`PriceCache::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup<T> {
    pub data: Vec<T>,
    /// True when `data` did not come from a refetch made by this call.
    pub cached: bool,
    /// True when a refetch failed and the previous snapshot is being served.
    pub stale: bool,
    pub age_seconds: Option<u64>,
}

impl<T> CacheLookup<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Holds the last successful snapshot and its fetch time.
///
/// A refetch either replaces the entry wholesale or is discarded. Concurrent
/// misses may both refetch; the later write wins.
pub struct PriceCache<T> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    source: Arc<dyn SnapshotSource<T>>,
    entry: RwLock<Option<CacheEntry<T>>>,
    metrics: Option<Arc<Metrics>>,
}

impl<T> PriceCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &'static str,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        source: Arc<dyn SnapshotSource<T>>,
    ) -> Self {
        Self {
            name,
            ttl,
            clock,
            source,
            entry: RwLock::new(None),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Read through the cache using the injected clock.
    pub async fn get(&self) -> CacheLookup<T> {
        self.get_at(self.clock.now()).await
    }

    /// Read through the cache as of `now`.
    pub async fn get_at(&self, now: DateTime<Utc>) -> CacheLookup<T> {
        if let Some(hit) = self.fresh_entry(now).await {
            self.count(|m| &m.cache_hits_total);
            return hit;
        }

        self.count(|m| &m.cache_misses_total);
        let fetched = self.source.fetch_snapshot().await;

        if !fetched.is_empty() {
            debug!(cache = self.name, entries = fetched.len(), "Cache refreshed");
            let mut entry = self.entry.write().await;
            *entry = Some(CacheEntry {
                value: fetched.clone(),
                fetched_at: now,
            });
            return CacheLookup {
                data: fetched,
                cached: false,
                stale: false,
                age_seconds: None,
            };
        }

        let entry = self.entry.read().await;
        match entry.as_ref() {
            Some(previous) if !previous.value.is_empty() => {
                let age = elapsed_millis(previous.fetched_at, now) / 1000;
                warn!(cache = self.name, age_secs = age, "Refetch failed, serving stale snapshot");
                self.count(|m| &m.cache_stale_served_total);
                CacheLookup {
                    data: previous.value.clone(),
                    cached: true,
                    stale: true,
                    age_seconds: Some(age),
                }
            }
            _ => {
                warn!(cache = self.name, "Refetch failed and nothing is cached");
                CacheLookup {
                    data: Vec::new(),
                    cached: false,
                    stale: false,
                    age_seconds: None,
                }
            }
        }
    }

    /// The current entry, without touching upstream.
    pub async fn peek(&self) -> Option<CacheEntry<T>> {
        self.entry.read().await.clone()
    }

    async fn fresh_entry(&self, now: DateTime<Utc>) -> Option<CacheLookup<T>> {
        let entry = self.entry.read().await;
        let entry = entry.as_ref()?;
        let age_ms = elapsed_millis(entry.fetched_at, now);
        if entry.value.is_empty() || u128::from(age_ms) >= self.ttl.as_millis() {
            return None;
        }
        Some(CacheLookup {
            data: entry.value.clone(),
            cached: true,
            stale: false,
            age_seconds: Some(age_ms / 1000),
        })
    }

    fn count(&self, counter: impl Fn(&Metrics) -> &prometheus::IntCounterVec) {
        if let Some(metrics) = &self.metrics {
            counter(metrics).with_label_values(&[self.name]).inc();
        }
    }
}
