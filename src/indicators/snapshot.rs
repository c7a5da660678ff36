//! Per-symbol technical snapshot computed from daily bars.

use crate::models::DailyBar;

use super::ema::ema;
use super::macd::{macd, MacdOutput};
use super::rsi::wilder_rsi_default;
use super::sma::sma;

/// Minimum daily bars before any indicator computation is attempted.
/// Below this the classification engine uses its proxy path instead.
pub const MIN_BARS: usize = 20;

pub const SMA_TREND_PERIOD: usize = 20;
pub const RSI_UPTREND_FLOOR: f64 = 60.0;

/// Indicator values for one symbol at one point in time. Individual
/// indicators can still be `None` when the series is long enough for
/// some but not all of them (MACD needs 34 bars, RSI only 15).
#[derive(Debug, Clone)]
pub struct TechnicalSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<MacdOutput>,
    pub sma_20: f64,
    pub ema_12: Option<f64>,
    pub last_close: f64,
}

impl TechnicalSnapshot {
    /// Compute from an ascending daily bar series. `None` below
    /// [`MIN_BARS`].
    pub fn from_daily_bars(bars: &[DailyBar]) -> Option<Self> {
        if bars.len() < MIN_BARS {
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let last_close = *closes.last()?;
        let sma_20 = sma(&closes, SMA_TREND_PERIOD)?;

        Some(Self {
            rsi: wilder_rsi_default(&closes),
            macd: macd(&closes),
            sma_20,
            ema_12: ema(&closes, 12),
            last_close,
        })
    }

    /// Trend read used by the technical report: strong RSI, positive
    /// MACD histogram, or price above its 20-bar mean.
    pub fn indicates_uptrend(&self) -> bool {
        if self.rsi.is_some_and(|rsi| rsi >= RSI_UPTREND_FLOOR) {
            return true;
        }
        if self.macd.is_some_and(|m| m.histogram > 0.0) {
            return true;
        }
        self.last_close > self.sma_20
    }
}
