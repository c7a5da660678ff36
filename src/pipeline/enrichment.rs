//! Enrichment stage: secondary lookups that must never stall the
//! primary pipeline.
//!
//! News, intraday volume, and daily-bar fetches fan out concurrently
//! across the batch's symbols, each bounded by a per-call timeout. Every
//! failure is soft: log it, count it, keep the last-known value.

use crate::indicators::TechnicalSnapshot;
use crate::metrics::Metrics;
use crate::models::NewsItem;
use crate::services::{FloatProvider, NewsProvider, SnapshotProvider};
use crate::store::MetricsStore;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// At most this many items are stored per symbol per poll.
pub const MAX_NEWS_PER_SYMBOL: usize = 5;
/// Short-window size for the intraday volume ratio, in minute bars.
pub const INTRADAY_WINDOW_MINUTES: usize = 5;
/// Regular-session minutes, the per-minute volume baseline divisor.
pub const SESSION_MINUTES: f64 = 390.0;
/// Daily bars requested for indicator computation.
pub const DAILY_BARS_REQUESTED: usize = 60;

pub struct EnrichmentStage {
    store: Arc<dyn MetricsStore>,
    snapshots: Arc<dyn SnapshotProvider>,
    news: Arc<dyn NewsProvider>,
    floats: Arc<dyn FloatProvider>,
    metrics: Arc<Metrics>,
    call_timeout: Duration,
    float_refresh_probability: f64,
}

impl EnrichmentStage {
    pub fn new(
        store: Arc<dyn MetricsStore>,
        snapshots: Arc<dyn SnapshotProvider>,
        news: Arc<dyn NewsProvider>,
        floats: Arc<dyn FloatProvider>,
        metrics: Arc<Metrics>,
        call_timeout: Duration,
        float_refresh_probability: f64,
    ) -> Self {
        Self {
            store,
            snapshots,
            news,
            floats,
            metrics,
            call_timeout,
            float_refresh_probability,
        }
    }

    /// Enrich every symbol in the batch. Returns the technical snapshots
    /// that could be computed this pass, keyed by symbol.
    pub async fn enrich_batch(
        &self,
        symbols: &[String],
    ) -> HashMap<String, TechnicalSnapshot> {
        let per_symbol = symbols.iter().map(|symbol| self.enrich_symbol(symbol));
        let results = futures_util::future::join_all(per_symbol).await;

        let mut technicals = HashMap::new();
        for (symbol, snapshot) in symbols.iter().zip(results) {
            if let Some(snapshot) = snapshot {
                technicals.insert(symbol.clone(), snapshot);
            }
        }

        self.maybe_refresh_floats(symbols).await;
        technicals
    }

    async fn enrich_symbol(&self, symbol: &str) -> Option<TechnicalSnapshot> {
        self.refresh_news(symbol).await;
        self.refresh_intraday(symbol).await;
        self.fetch_technicals(symbol).await
    }

    async fn refresh_news(&self, symbol: &str) {
        match timeout(self.call_timeout, self.news.recent_articles(symbol)).await {
            Ok(Ok(articles)) if !articles.is_empty() => {
                let mut articles = articles;
                articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                for article in articles.into_iter().take(MAX_NEWS_PER_SYMBOL) {
                    self.store
                        .add_news(NewsItem {
                            symbol: symbol.to_string(),
                            title: article.title,
                            summary: article.description,
                            published_at: article.published_at,
                            url: article.url,
                        })
                        .await;
                }
                let count = self.store.news_for(symbol).await.len() as u32;
                self.store.record_news(symbol, count).await;
            }
            Ok(Ok(_)) => {
                // An empty poll must not downgrade a previously-seen
                // hasNews; leave the stored flags alone.
                debug!(symbol = %symbol, "no news this poll");
            }
            Ok(Err(e)) => {
                self.metrics.enrichment_failures_total.inc();
                warn!(symbol = %symbol, error = %e, "news lookup failed, keeping last-known state");
            }
            Err(_) => {
                self.metrics.enrichment_failures_total.inc();
                warn!(symbol = %symbol, "news lookup timed out, keeping last-known state");
            }
        }
    }

    async fn refresh_intraday(&self, symbol: &str) {
        let Some(existing) = self.store.get(symbol).await else {
            return;
        };

        match timeout(
            self.call_timeout,
            self.snapshots
                .recent_minute_bars(symbol, INTRADAY_WINDOW_MINUTES),
        )
        .await
        {
            Ok(Ok(bars))
                if bars.len() >= INTRADAY_WINDOW_MINUTES && existing.previous_volume > 0 =>
            {
                let window_volume: f64 = bars
                    .iter()
                    .rev()
                    .take(INTRADAY_WINDOW_MINUTES)
                    .map(|b| b.volume)
                    .sum();
                let baseline = existing.previous_volume as f64 / SESSION_MINUTES
                    * INTRADAY_WINDOW_MINUTES as f64;
                let ratio = window_volume / baseline * 100.0;
                self.store.set_intraday(symbol, ratio, false).await;
            }
            Ok(Ok(_)) => {
                // Too few bars: fall back to the daily relative volume
                // as a scaled estimate, explicitly labeled estimated.
                self.store
                    .set_intraday(symbol, existing.relative_volume, true)
                    .await;
            }
            Ok(Err(e)) => {
                self.metrics.enrichment_failures_total.inc();
                warn!(symbol = %symbol, error = %e, "minute-bar lookup failed, keeping last-known intraday value");
            }
            Err(_) => {
                self.metrics.enrichment_failures_total.inc();
                warn!(symbol = %symbol, "minute-bar lookup timed out, keeping last-known intraday value");
            }
        }
    }

    async fn fetch_technicals(&self, symbol: &str) -> Option<TechnicalSnapshot> {
        match timeout(
            self.call_timeout,
            self.snapshots.daily_bars(symbol, DAILY_BARS_REQUESTED),
        )
        .await
        {
            Ok(Ok(bars)) => TechnicalSnapshot::from_daily_bars(&bars),
            Ok(Err(e)) => {
                self.metrics.enrichment_failures_total.inc();
                debug!(symbol = %symbol, error = %e, "daily-bar lookup failed, technical report will use the proxy path");
                None
            }
            Err(_) => {
                self.metrics.enrichment_failures_total.inc();
                debug!(symbol = %symbol, "daily-bar lookup timed out, technical report will use the proxy path");
                None
            }
        }
    }

    /// Batched float refresh. The float source is rate-sensitive, so
    /// this fires probabilistically per tick and only asks about symbols
    /// whose float is still unknown.
    async fn maybe_refresh_floats(&self, symbols: &[String]) {
        let roll: f64 = rand::thread_rng().gen();
        if roll >= self.float_refresh_probability {
            return;
        }

        let unknown: Vec<String> = self
            .store
            .filter(&|m| m.float_shares.is_none())
            .await
            .into_iter()
            .map(|m| m.symbol)
            .filter(|s| symbols.contains(s))
            .collect();
        if unknown.is_empty() {
            return;
        }

        match timeout(self.call_timeout, self.floats.float_shares(&unknown)).await {
            Ok(Ok(floats)) => {
                for (symbol, millions) in floats {
                    let shares = (millions * 1_000_000.0).round() as u64;
                    self.store.set_float_shares(&symbol, shares).await;
                }
            }
            Ok(Err(e)) => {
                self.metrics.enrichment_failures_total.inc();
                warn!(error = %e, "float batch failed, keeping last-known floats");
            }
            Err(_) => {
                self.metrics.enrichment_failures_total.inc();
                warn!("float batch timed out, keeping last-known floats");
            }
        }
    }
}
