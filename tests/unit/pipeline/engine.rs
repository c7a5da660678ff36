//! End-to-end pipeline pass over stub providers

use async_trait::async_trait;
use chrono::Utc;
use gapscan::config::Config;
use gapscan::error::ScannerError;
use gapscan::metrics::Metrics;
use gapscan::models::{DailyBar, MinuteBar, RawTickerSnapshot};
use gapscan::pipeline::ScannerEngine;
use gapscan::reports::ReportId;
use gapscan::services::{
    FloatProvider, MoverDirection, NewsArticle, NewsProvider, SnapshotProvider,
};
use gapscan::store::{InMemoryMetricsStore, MetricsStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct StubSnapshots {
    gainers: Vec<RawTickerSnapshot>,
    losers: Vec<RawTickerSnapshot>,
    pulls: AtomicUsize,
}

impl StubSnapshots {
    fn new(gainers: Vec<RawTickerSnapshot>, losers: Vec<RawTickerSnapshot>) -> Self {
        Self {
            gainers,
            losers,
            pulls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SnapshotProvider for StubSnapshots {
    async fn top_movers(
        &self,
        direction: MoverDirection,
    ) -> Result<Vec<RawTickerSnapshot>, ScannerError> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        Ok(match direction {
            MoverDirection::Gainers => self.gainers.clone(),
            MoverDirection::Losers => self.losers.clone(),
        })
    }

    async fn recent_minute_bars(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<MinuteBar>, ScannerError> {
        Ok(Vec::new())
    }

    async fn daily_bars(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<DailyBar>, ScannerError> {
        Ok(Vec::new())
    }
}

/// Tracks how many provider calls are in flight at once.
struct OverlapTrackingSnapshots {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl OverlapTrackingSnapshots {
    fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SnapshotProvider for OverlapTrackingSnapshots {
    async fn top_movers(
        &self,
        _direction: MoverDirection,
    ) -> Result<Vec<RawTickerSnapshot>, ScannerError> {
        let in_flight = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(in_flight, Ordering::SeqCst);
        // Hold the call open long enough for an unguarded second pass to
        // overlap.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn recent_minute_bars(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<MinuteBar>, ScannerError> {
        Ok(Vec::new())
    }

    async fn daily_bars(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<DailyBar>, ScannerError> {
        Ok(Vec::new())
    }
}

struct FailingSnapshots;

#[async_trait]
impl SnapshotProvider for FailingSnapshots {
    async fn top_movers(
        &self,
        _direction: MoverDirection,
    ) -> Result<Vec<RawTickerSnapshot>, ScannerError> {
        Err(ScannerError::upstream("snapshots", "connection refused"))
    }

    async fn recent_minute_bars(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<MinuteBar>, ScannerError> {
        Err(ScannerError::upstream("snapshots", "connection refused"))
    }

    async fn daily_bars(
        &self,
        _symbol: &str,
        _limit: usize,
    ) -> Result<Vec<DailyBar>, ScannerError> {
        Err(ScannerError::upstream("snapshots", "connection refused"))
    }
}

struct StubNews {
    articles: HashMap<String, Vec<NewsArticle>>,
}

#[async_trait]
impl NewsProvider for StubNews {
    async fn recent_articles(&self, symbol: &str) -> Result<Vec<NewsArticle>, ScannerError> {
        Ok(self.articles.get(symbol).cloned().unwrap_or_default())
    }
}

struct StubFloats {
    millions: HashMap<String, f64>,
}

#[async_trait]
impl FloatProvider for StubFloats {
    async fn float_shares(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, ScannerError> {
        Ok(symbols
            .iter()
            .filter_map(|s| self.millions.get(s).map(|m| (s.clone(), *m)))
            .collect())
    }
}

fn raw(symbol: &str, volume: u64, close: f64, gap: f64, prior_volume: u64) -> RawTickerSnapshot {
    RawTickerSnapshot {
        symbol: symbol.to_string(),
        today_open: Some(close),
        today_close: Some(close),
        today_high: Some(close),
        today_low: Some(close),
        today_volume: Some(volume),
        prior_close: Some(close),
        prior_volume: Some(prior_volume),
        percent_change_today: Some(gap),
    }
}

fn article(title: &str) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        description: None,
        published_at: Utc::now(),
        url: Some(format!("https://news.test/{}", title.replace(' ', "-"))),
    }
}

struct TestHarness {
    engine: Arc<ScannerEngine>,
    store: Arc<InMemoryMetricsStore>,
}

fn harness(
    gainers: Vec<RawTickerSnapshot>,
    losers: Vec<RawTickerSnapshot>,
    articles: HashMap<String, Vec<NewsArticle>>,
    millions: HashMap<String, f64>,
    float_refresh_probability: f64,
) -> TestHarness {
    let config = Config {
        float_refresh_probability,
        ..Config::default()
    };
    let store = Arc::new(InMemoryMetricsStore::new());
    let engine = Arc::new(ScannerEngine::new(
        &config,
        store.clone(),
        Arc::new(StubSnapshots::new(gainers, losers)),
        Arc::new(StubNews { articles }),
        Arc::new(StubFloats { millions }),
        Arc::new(Metrics::new().unwrap()),
    ));
    TestHarness { engine, store }
}

#[tokio::test]
async fn full_pass_admits_enriches_and_publishes() {
    // GAPR: 60k shares on 10k prior (600% relative volume), +4% gap,
    // $10, news, 2M float. THIN: below the liquidity floor.
    let gainers = vec![
        raw("THIN", 40_000, 10.0, 8.0, 10_000),
        raw("GAPR", 60_000, 10.0, 4.0, 10_000),
    ];
    let mut articles = HashMap::new();
    articles.insert("GAPR".to_string(), vec![article("Offering priced")]);
    let mut millions = HashMap::new();
    millions.insert("GAPR".to_string(), 2.0);

    let h = harness(gainers, Vec::new(), articles, millions, 1.0);
    h.engine.refresh_now().await.unwrap();

    assert!(h.store.get("THIN").await.is_none());

    let stored = h.store.get("GAPR").await.unwrap();
    assert_eq!(stored.relative_volume, 600.0);
    assert!(stored.has_news);
    assert_eq!(stored.news_count, 1);
    assert_eq!(stored.float_shares, Some(2_000_000));
    // No minute bars from the stub, so the intraday read is the scaled
    // estimate.
    assert!(stored.intraday_estimated);
    assert_eq!(stored.relative_volume_intraday, Some(600.0));

    // Four of the five flagship criteria hold (gap misses its floor).
    let flagship = h.engine.report(ReportId::MoysTopGappers).await;
    assert_eq!(flagship.len(), 1);
    assert_eq!(flagship[0].symbol, "GAPR");

    let published = h.engine.last_published().await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].symbol, "GAPR");
}

#[tokio::test]
async fn repeated_news_does_not_inflate_the_count() {
    let gainers = vec![raw("GAPR", 60_000, 10.0, 4.0, 10_000)];
    let mut articles = HashMap::new();
    articles.insert("GAPR".to_string(), vec![article("Offering priced")]);

    let h = harness(gainers, Vec::new(), articles, HashMap::new(), 0.0);
    h.engine.refresh_now().await.unwrap();
    h.engine.refresh_now().await.unwrap();

    let stored = h.store.get("GAPR").await.unwrap();
    assert_eq!(stored.news_count, 1);
    assert_eq!(h.engine.news("GAPR").await.len(), 1);
}

#[tokio::test]
async fn failed_pull_keeps_the_last_published_set() {
    let config = Config::default();
    let store = Arc::new(InMemoryMetricsStore::new());
    let engine = ScannerEngine::new(
        &config,
        store,
        Arc::new(FailingSnapshots),
        Arc::new(StubNews {
            articles: HashMap::new(),
        }),
        Arc::new(StubFloats {
            millions: HashMap::new(),
        }),
        Arc::new(Metrics::new().unwrap()),
    );

    // Both pulls fail. The pass recovers and publishes nothing new.
    engine.refresh_now().await.unwrap();
    assert!(engine.last_published().await.is_none());
}

#[tokio::test]
async fn duplicate_symbols_across_pulls_collapse() {
    // The same symbol can show up in both the gainers and losers pulls.
    let record = raw("GAPR", 60_000, 10.0, 4.0, 10_000);
    let h = harness(
        vec![record.clone()],
        vec![record],
        HashMap::new(),
        HashMap::new(),
        0.0,
    );
    h.engine.refresh_now().await.unwrap();

    let published = h.engine.last_published().await.unwrap();
    assert_eq!(published.len(), 1);
}

#[tokio::test]
async fn concurrent_refreshes_queue_rather_than_overlap() {
    let snapshots = Arc::new(OverlapTrackingSnapshots::new());
    let config = Config {
        float_refresh_probability: 0.0,
        ..Config::default()
    };
    let engine = Arc::new(ScannerEngine::new(
        &config,
        Arc::new(InMemoryMetricsStore::new()),
        snapshots.clone(),
        Arc::new(StubNews {
            articles: HashMap::new(),
        }),
        Arc::new(StubFloats {
            millions: HashMap::new(),
        }),
        Arc::new(Metrics::new().unwrap()),
    ));

    // A scheduled tick and a manual request land at the same time. The
    // second must wait for the first to finish, not run alongside it.
    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.refresh_now().await }
    });
    let second = tokio::spawn({
        let engine = engine.clone();
        async move { engine.refresh_now().await }
    });
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(
        snapshots.peak.load(Ordering::SeqCst),
        1,
        "provider calls from separate passes overlapped"
    );
}

#[tokio::test]
async fn subscribers_see_each_pass() {
    let gainers = vec![raw("GAPR", 60_000, 10.0, 4.0, 10_000)];
    let h = harness(gainers, Vec::new(), HashMap::new(), HashMap::new(), 0.0);

    let mut receiver = h.engine.subscribe();
    h.engine.refresh_now().await.unwrap();

    let set = receiver.recv().await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].symbol, "GAPR");
}
