use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One daily bar, ascending-time series input for indicator computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

/// One minute bar, used for the short-window intraday volume ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinuteBar {
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}
