//! Market snapshot source: gainers/losers pulls and bar history.

use crate::error::ScannerError;
use crate::models::{DailyBar, MinuteBar, RawTickerSnapshot};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const QUOTA_HEADER: &str = "x-ratelimit-remaining";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverDirection {
    Gainers,
    Losers,
}

impl MoverDirection {
    pub fn path_segment(&self) -> &'static str {
        match self {
            MoverDirection::Gainers => "gainers",
            MoverDirection::Losers => "losers",
        }
    }
}

#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// One pull of the named gainers or losers set.
    async fn top_movers(
        &self,
        direction: MoverDirection,
    ) -> Result<Vec<RawTickerSnapshot>, ScannerError>;

    /// Most recent minute bars for a symbol, ascending, at most `limit`.
    async fn recent_minute_bars(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<MinuteBar>, ScannerError>;

    /// Most recent daily bars for a symbol, ascending, at most `limit`.
    async fn daily_bars(&self, symbol: &str, limit: usize)
        -> Result<Vec<DailyBar>, ScannerError>;
}

// Wire types for the Polygon-style snapshot endpoints.

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[serde(default)]
    tickers: Vec<SnapshotTicker>,
}

#[derive(Debug, Deserialize)]
struct SnapshotTicker {
    ticker: String,
    #[serde(default)]
    day: Option<SnapshotDay>,
    #[serde(default, rename = "prevDay")]
    prev_day: Option<SnapshotDay>,
    #[serde(rename = "todaysChangePerc")]
    todays_change_perc: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SnapshotDay {
    o: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
    c: Option<f64>,
    v: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AggsResponse {
    #[serde(default)]
    results: Vec<AggBar>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    c: f64,
    v: f64,
    /// Bar start in epoch milliseconds.
    t: i64,
}

impl SnapshotTicker {
    fn into_raw(self) -> RawTickerSnapshot {
        let day = self.day.unwrap_or(SnapshotDay {
            o: None,
            h: None,
            l: None,
            c: None,
            v: None,
        });
        let prev = self.prev_day.unwrap_or(SnapshotDay {
            o: None,
            h: None,
            l: None,
            c: None,
            v: None,
        });
        RawTickerSnapshot {
            symbol: self.ticker,
            today_open: day.o,
            today_close: day.c,
            today_high: day.h,
            today_low: day.l,
            today_volume: day.v.map(|v| v as u64),
            prior_close: prev.c,
            prior_volume: prev.v.map(|v| v as u64),
            percent_change_today: self.todays_change_perc,
        }
    }
}

/// Polygon-style HTTP snapshot client. The base URL is injectable so
/// integration tests can point it at a mock server.
pub struct PolygonSnapshotClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl PolygonSnapshotClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        // A client without the timeout would let one slow upstream call
        // stall a pass, so a broken builder is fatal at construction.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("snapshot http client");
        Self::with_client(base_url, api_key, client)
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, ScannerError> {
        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ScannerError::upstream("snapshots", e.to_string()))?;

        // Provider-communicated quota is informational only, never
        // enforced internally.
        if let Some(remaining) = response
            .headers()
            .get(QUOTA_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            info!(remaining = %remaining, "snapshot provider quota remaining");
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::upstream(
                "snapshots",
                format!("HTTP {} from {}", status, url),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ScannerError::upstream("snapshots", e.to_string()))
    }

    async fn fetch_movers(
        &self,
        direction: MoverDirection,
    ) -> Result<Vec<RawTickerSnapshot>, ScannerError> {
        let url = format!(
            "{}/v2/snapshot/locale/us/markets/stocks/{}",
            self.base_url,
            direction.path_segment()
        );
        let response: SnapshotResponse = self.get_json(url).await?;
        debug!(
            direction = direction.path_segment(),
            count = response.tickers.len(),
            "fetched snapshot batch"
        );
        Ok(response
            .tickers
            .into_iter()
            .map(SnapshotTicker::into_raw)
            .collect())
    }

    async fn fetch_aggs(
        &self,
        symbol: &str,
        timespan: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AggBar>, ScannerError> {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/{}/{}/{}?sort=asc&limit={}",
            self.base_url,
            symbol,
            timespan,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
            limit
        );
        let response: AggsResponse = self.get_json(url).await?;
        Ok(response.results)
    }
}

#[async_trait]
impl SnapshotProvider for PolygonSnapshotClient {
    async fn top_movers(
        &self,
        direction: MoverDirection,
    ) -> Result<Vec<RawTickerSnapshot>, ScannerError> {
        (|| async { self.fetch_movers(direction).await })
            .retry(ExponentialBuilder::default().with_max_times(2))
            .notify(|err: &ScannerError, dur: Duration| {
                warn!(error = %err, backoff_ms = dur.as_millis() as u64, "retrying snapshot pull");
            })
            .await
    }

    async fn recent_minute_bars(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<MinuteBar>, ScannerError> {
        let to = Utc::now();
        let from = to - ChronoDuration::hours(2);
        let bars = self.fetch_aggs(symbol, "minute", from, to, 240).await?;
        let mut out: Vec<MinuteBar> = bars
            .into_iter()
            .filter_map(|bar| {
                DateTime::from_timestamp_millis(bar.t).map(|timestamp| MinuteBar {
                    volume: bar.v,
                    timestamp,
                })
            })
            .collect();
        if out.len() > limit {
            out = out.split_off(out.len() - limit);
        }
        Ok(out)
    }

    async fn daily_bars(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<DailyBar>, ScannerError> {
        let to = Utc::now();
        let from = to - ChronoDuration::days(120);
        let bars = self.fetch_aggs(symbol, "day", from, to, limit).await?;
        Ok(bars
            .into_iter()
            .filter_map(|bar| {
                DateTime::from_timestamp_millis(bar.t).map(|timestamp| DailyBar {
                    close: bar.c,
                    volume: bar.v,
                    timestamp,
                })
            })
            .collect())
    }
}
