//! SMA (Simple Moving Average)

/// Mean of the last `period` closes, or of all available closes when the
/// series is shorter.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if closes.is_empty() || period == 0 {
        return None;
    }
    let window = &closes[closes.len().saturating_sub(period)..];
    Some(window.iter().sum::<f64>() / window.len() as f64)
}
