//! EMA (Exponential Moving Average)

/// EMA series over ascending values, seeded with the simple average of
/// the first `period` values. The first output corresponds to input
/// index `period - 1`; smoothing factor k = 2 / (period + 1).
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    let mut prev = seed;
    for &value in &values[period..] {
        let next = value * k + prev * (1.0 - k);
        out.push(next);
        prev = next;
    }
    Some(out)
}

/// Latest EMA value for a period.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).and_then(|series| series.last().copied())
}
