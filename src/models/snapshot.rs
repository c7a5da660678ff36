use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw ticker record as delivered by the snapshot source. Numeric fields
/// are optional at the wire level; the normalizer decides which are
/// required and drops the record otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTickerSnapshot {
    pub symbol: String,
    pub today_open: Option<f64>,
    pub today_close: Option<f64>,
    pub today_high: Option<f64>,
    pub today_low: Option<f64>,
    pub today_volume: Option<u64>,
    pub prior_close: Option<f64>,
    pub prior_volume: Option<u64>,
    /// Percent change as computed by the provider. Trusted verbatim.
    pub percent_change_today: Option<f64>,
}

/// Canonical per-symbol record flowing through the pipeline.
///
/// `symbol` is immutable once created; updates are keyed merges through
/// the store. `gap_percentage` and `relative_volume` are recomputed from
/// every snapshot, while float/news fields are additive-only: a new
/// non-null value overwrites, a missing value never clears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolMetrics {
    pub symbol: String,
    pub price: f64,
    /// Shares traded today.
    pub volume: u64,
    /// Shares traded in the prior session.
    pub previous_volume: u64,
    /// Signed percent change vs. the prior close.
    pub gap_percentage: f64,
    /// Today's volume over the prior session's, as a percentage
    /// (100 = average).
    pub relative_volume: f64,
    /// Short-window volume ratio. `None` until intraday enrichment has
    /// run for this symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_volume_intraday: Option<f64>,
    /// True when the intraday ratio is a scaled estimate rather than a
    /// measurement from minute bars.
    pub intraday_estimated: bool,
    /// Shares available to trade, sourced asynchronously.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float_shares: Option<u64>,
    pub has_news: bool,
    pub news_count: u32,
    pub last_updated: DateTime<Utc>,
}

impl SymbolMetrics {
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        volume: u64,
        previous_volume: u64,
        gap_percentage: f64,
        relative_volume: f64,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            price,
            volume,
            previous_volume,
            gap_percentage,
            relative_volume,
            relative_volume_intraday: None,
            intraday_estimated: false,
            float_shares: None,
            has_news: false,
            news_count: 0,
            last_updated: Utc::now(),
        }
    }

    pub fn with_float_shares(mut self, shares: u64) -> Self {
        self.float_shares = Some(shares);
        self
    }

    pub fn with_news(mut self, count: u32) -> Self {
        self.has_news = count > 0;
        self.news_count = count;
        self
    }
}

/// A news article attached to a symbol. Deduplicated per symbol by the
/// `(title, url)` pair; the per-symbol set only grows within the process
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub symbol: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NewsItem {
    /// Identity used for deduplication.
    pub fn dedup_key(&self) -> (&str, Option<&str>) {
        (self.title.as_str(), self.url.as_deref())
    }
}
