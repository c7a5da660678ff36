//! RSI (Relative Strength Index) with Wilder's smoothing

pub const RSI_PERIOD: usize = 14;

/// Wilder RSI over an ascending close series.
///
/// Seeds the average gain/loss from the first `period` deltas, then
/// applies the recurrence `avg = (avg * (period - 1) + value) / period`.
/// RSI = 100 when the average loss is zero.
pub fn wilder_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    for i in (period + 1)..closes.len() {
        let change = closes[i] - closes[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// RSI with the default 14-bar period.
pub fn wilder_rsi_default(closes: &[f64]) -> Option<f64> {
    wilder_rsi(closes, RSI_PERIOD)
}
