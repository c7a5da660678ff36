//! Symbol store abstraction and the in-memory implementation.
//!
//! The store owns the merge invariants: gap and relative volume are
//! always taken from the latest snapshot, float/news fields are
//! additive-only, and `list` preserves first-sighting order so stable
//! sorts stay deterministic across runs.

use crate::models::{NewsItem, SymbolMetrics};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Predicate type accepted by [`MetricsStore::filter`].
pub type MetricsPredicate<'a> = &'a (dyn Fn(&SymbolMetrics) -> bool + Send + Sync);

#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn get(&self, symbol: &str) -> Option<SymbolMetrics>;

    /// Keyed merge: creates the record on first sighting, otherwise
    /// merges per the invariants above. Returns the stored record.
    async fn upsert(&self, incoming: SymbolMetrics) -> SymbolMetrics;

    /// All records in first-sighting order.
    async fn list(&self) -> Vec<SymbolMetrics>;

    /// Records matching `predicate`, in first-sighting order.
    async fn filter(&self, predicate: MetricsPredicate<'_>) -> Vec<SymbolMetrics>;

    /// Set the float for a symbol. No-op when the symbol is unknown.
    async fn set_float_shares(&self, symbol: &str, shares: u64);

    /// Raise the news flags for a symbol. `has_news` never goes back to
    /// false and `news_count` never decreases.
    async fn record_news(&self, symbol: &str, count: u32);

    /// Set the intraday relative volume and whether it is an estimate.
    async fn set_intraday(&self, symbol: &str, relative_volume: f64, estimated: bool);

    /// Attach a news item, deduplicated by `(title, url)`. Returns the
    /// stored item, which is the existing one when a duplicate comes in.
    async fn add_news(&self, item: NewsItem) -> NewsItem;

    async fn news_for(&self, symbol: &str) -> Vec<NewsItem>;
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<String, SymbolMetrics>,
    /// Symbol keys in first-sighting order.
    order: Vec<String>,
    news: HashMap<String, Vec<NewsItem>>,
}

/// Process-lifetime in-memory store.
#[derive(Default)]
pub struct InMemoryMetricsStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Merge an incoming snapshot-derived record into an existing one.
/// Snapshot-derived fields always win; float/news fields are additive.
fn merge(existing: &SymbolMetrics, incoming: SymbolMetrics) -> SymbolMetrics {
    SymbolMetrics {
        symbol: existing.symbol.clone(),
        price: incoming.price,
        volume: incoming.volume,
        previous_volume: incoming.previous_volume,
        gap_percentage: incoming.gap_percentage,
        relative_volume: incoming.relative_volume,
        relative_volume_intraday: incoming
            .relative_volume_intraday
            .or(existing.relative_volume_intraday),
        intraday_estimated: if incoming.relative_volume_intraday.is_some() {
            incoming.intraday_estimated
        } else {
            existing.intraday_estimated
        },
        float_shares: incoming.float_shares.or(existing.float_shares),
        has_news: existing.has_news || incoming.has_news,
        news_count: existing.news_count.max(incoming.news_count),
        last_updated: Utc::now(),
    }
}

#[async_trait]
impl MetricsStore for InMemoryMetricsStore {
    async fn get(&self, symbol: &str) -> Option<SymbolMetrics> {
        let inner = self.inner.read().await;
        inner.records.get(&symbol.to_uppercase()).cloned()
    }

    async fn upsert(&self, incoming: SymbolMetrics) -> SymbolMetrics {
        let key = incoming.symbol.to_uppercase();
        let mut inner = self.inner.write().await;
        let stored = match inner.records.get(&key) {
            Some(existing) => merge(existing, incoming),
            None => {
                inner.order.push(key.clone());
                let mut created = incoming;
                created.symbol = key.clone();
                created.last_updated = Utc::now();
                created
            }
        };
        inner.records.insert(key, stored.clone());
        stored
    }

    async fn list(&self) -> Vec<SymbolMetrics> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|key| inner.records.get(key).cloned())
            .collect()
    }

    async fn filter(&self, predicate: MetricsPredicate<'_>) -> Vec<SymbolMetrics> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|key| inner.records.get(key))
            .filter(|m| predicate(m))
            .cloned()
            .collect()
    }

    async fn set_float_shares(&self, symbol: &str, shares: u64) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.records.get_mut(&symbol.to_uppercase()) {
            record.float_shares = Some(shares);
            record.last_updated = Utc::now();
        }
    }

    async fn record_news(&self, symbol: &str, count: u32) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.records.get_mut(&symbol.to_uppercase()) {
            record.has_news = record.has_news || count > 0;
            record.news_count = record.news_count.max(count);
            record.last_updated = Utc::now();
        }
    }

    async fn set_intraday(&self, symbol: &str, relative_volume: f64, estimated: bool) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.records.get_mut(&symbol.to_uppercase()) {
            record.relative_volume_intraday = Some(relative_volume);
            record.intraday_estimated = estimated;
            record.last_updated = Utc::now();
        }
    }

    async fn add_news(&self, item: NewsItem) -> NewsItem {
        let key = item.symbol.to_uppercase();
        let mut inner = self.inner.write().await;
        let items = inner.news.entry(key).or_default();
        if let Some(existing) = items.iter().find(|i| i.dedup_key() == item.dedup_key()) {
            return existing.clone();
        }
        items.push(item.clone());
        item
    }

    async fn news_for(&self, symbol: &str) -> Vec<NewsItem> {
        let inner = self.inner.read().await;
        inner
            .news
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_default()
    }
}
