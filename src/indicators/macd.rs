//! MACD (Moving Average Convergence Divergence)

use super::ema::ema_series;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD(12, 26, 9) over an ascending close series.
///
/// MACD = EMA(12) - EMA(26), aligned on the slower series' start index;
/// signal = EMA(9) of the MACD series; histogram = MACD - signal.
/// Needs at least `MACD_SLOW + MACD_SIGNAL - 1` closes.
pub fn macd(closes: &[f64]) -> Option<MacdOutput> {
    let fast = ema_series(closes, MACD_FAST)?;
    let slow = ema_series(closes, MACD_SLOW)?;

    // fast[0] sits at close index MACD_FAST - 1; skip ahead so both
    // series start at the slow series' first index.
    let offset = MACD_SLOW - MACD_FAST;
    let macd_series: Vec<f64> = slow
        .iter()
        .zip(fast[offset..].iter())
        .map(|(s, f)| f - s)
        .collect();

    let signal_series = ema_series(&macd_series, MACD_SIGNAL)?;
    let macd_value = *macd_series.last()?;
    let signal_value = *signal_series.last()?;

    Some(MacdOutput {
        macd: macd_value,
        signal: signal_value,
        histogram: macd_value - signal_value,
    })
}
