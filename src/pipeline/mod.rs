//! The scanner pipeline: normalize -> enrich -> classify -> rank ->
//! publish, behind a single refresh gate.

pub mod enrichment;
pub mod normalizer;

pub use enrichment::EnrichmentStage;

use crate::config::Config;
use crate::error::ScannerError;
use crate::indicators::TechnicalSnapshot;
use crate::metrics::Metrics;
use crate::models::{NewsItem, SymbolMetrics};
use crate::publish::{Publisher, ReportSet};
use crate::reports::{self, ReportId};
use crate::scheduler::session::SessionWindow;
use crate::services::{FloatProvider, MoverDirection, NewsProvider, SnapshotProvider};
use crate::store::MetricsStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{info, warn};

/// One logical pipeline instance. All refreshes, scheduled ticks and
/// manual requests alike, funnel through [`ScannerEngine::refresh_now`]
/// and queue on one async mutex, so at most one pass is ever in flight.
pub struct ScannerEngine {
    store: Arc<dyn MetricsStore>,
    snapshots: Arc<dyn SnapshotProvider>,
    enrichment: EnrichmentStage,
    publisher: Publisher,
    session: SessionWindow,
    metrics: Arc<Metrics>,
    refresh_gate: Mutex<()>,
    /// Technical snapshots computed during the most recent pass.
    technicals: RwLock<HashMap<String, TechnicalSnapshot>>,
}

impl ScannerEngine {
    pub fn new(
        config: &Config,
        store: Arc<dyn MetricsStore>,
        snapshots: Arc<dyn SnapshotProvider>,
        news: Arc<dyn NewsProvider>,
        floats: Arc<dyn FloatProvider>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let enrichment = EnrichmentStage::new(
            store.clone(),
            snapshots.clone(),
            news,
            floats,
            metrics.clone(),
            config.enrichment_timeout,
            config.float_refresh_probability,
        );
        Self {
            store,
            snapshots,
            enrichment,
            publisher: Publisher::new(),
            session: SessionWindow::from_config(config),
            metrics,
            refresh_gate: Mutex::new(()),
            technicals: RwLock::new(HashMap::new()),
        }
    }

    /// Run one full pipeline pass and publish the default ranked set.
    ///
    /// Upstream and per-record failures are recovered here; the only
    /// way this returns `Err` is a bug, so the scheduler logs and keeps
    /// ticking either way.
    pub async fn refresh_now(&self) -> Result<(), ScannerError> {
        let _pass = self.refresh_gate.lock().await;
        let started = Instant::now();

        let mut batch = Vec::new();
        for direction in [MoverDirection::Gainers, MoverDirection::Losers] {
            match self.snapshots.top_movers(direction).await {
                Ok(records) => batch.extend(records),
                Err(e) => {
                    // Soft: this side of the universe keeps its
                    // last-known state until the next pass.
                    warn!(error = %e, "snapshot pull failed");
                }
            }
        }
        if batch.is_empty() {
            warn!("no snapshot data this pass, retaining last published set");
            return Ok(());
        }

        let mut admitted_symbols = Vec::new();
        for raw in &batch {
            match normalizer::normalize(raw) {
                Ok(Some(metrics)) => {
                    let stored = self.store.upsert(metrics).await;
                    if !admitted_symbols.contains(&stored.symbol) {
                        admitted_symbols.push(stored.symbol);
                    }
                    self.metrics.symbols_admitted_total.inc();
                }
                Ok(None) => {
                    self.metrics.records_dropped_total.inc();
                }
                Err(e) => {
                    self.metrics.records_dropped_total.inc();
                    warn!(error = %e, "dropping malformed record");
                }
            }
        }

        let technicals = self.enrichment.enrich_batch(&admitted_symbols).await;
        *self.technicals.write().await = technicals;

        let ranked = self.report(ReportId::TopGappers).await;
        let published = ranked.len();
        self.publisher.publish(ranked).await;

        let elapsed = started.elapsed();
        self.metrics.refresh_passes_total.inc();
        self.metrics
            .refresh_duration_seconds
            .observe(elapsed.as_secs_f64());
        info!(
            admitted = admitted_symbols.len(),
            published = published,
            elapsed_ms = elapsed.as_millis() as u64,
            "refresh pass complete"
        );
        Ok(())
    }

    /// Ranked entries for one named report, computed over the full
    /// tracked universe.
    pub async fn report(&self, id: ReportId) -> Vec<SymbolMetrics> {
        let universe = self.store.list().await;
        let technicals = self.technicals.read().await;
        reports::build_report(&reports::definition(id), &universe, &technicals)
    }

    pub async fn news(&self, symbol: &str) -> Vec<NewsItem> {
        self.store.news_for(symbol).await
    }

    pub fn is_session_active(&self) -> bool {
        self.session.is_active_now()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReportSet> {
        self.publisher.subscribe()
    }

    pub async fn last_published(&self) -> Option<ReportSet> {
        self.publisher.last_published().await
    }

    pub fn subscriber_count(&self) -> usize {
        self.publisher.subscriber_count()
    }
}
