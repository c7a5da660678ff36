//! Snapshot normalizer: raw ticker records into canonical metrics.

use crate::error::ScannerError;
use crate::models::{RawTickerSnapshot, SymbolMetrics};

/// Hard admission filter: records at or below this volume never enter
/// the pipeline.
pub const MIN_DAILY_VOLUME: u64 = 50_000;

/// Only gapping stocks proceed: |gap| must exceed this. Defines what a
/// candidate gapper even is, independent of any report's thresholds.
pub const MIN_GAP_PERCENT: f64 = 3.0;

/// Relative volume when the prior session traded nothing.
pub const NEUTRAL_RELATIVE_VOLUME: f64 = 100.0;

/// Normalize one raw record.
///
/// `Ok(Some)`: admitted. `Ok(None)`: filtered out (illiquid or not
/// gapping). `Err(MalformedRecord)`: required fields missing; the
/// caller drops the record and continues with the batch.
pub fn normalize(raw: &RawTickerSnapshot) -> Result<Option<SymbolMetrics>, ScannerError> {
    let symbol = raw.symbol.trim();
    if symbol.is_empty() {
        return Err(ScannerError::MalformedRecord {
            symbol: raw.symbol.clone(),
            reason: "empty symbol",
        });
    }

    let volume = require(raw, raw.today_volume, "today_volume")?;
    if volume <= MIN_DAILY_VOLUME {
        return Ok(None);
    }

    let price = require(raw, raw.today_close, "today_close")?;
    let gap_percentage = require(raw, raw.percent_change_today, "percent_change_today")?;
    if gap_percentage.abs() <= MIN_GAP_PERCENT {
        return Ok(None);
    }

    let previous_volume = raw.prior_volume.unwrap_or(0);
    let relative_volume = if previous_volume > 0 {
        volume as f64 / previous_volume as f64 * 100.0
    } else {
        NEUTRAL_RELATIVE_VOLUME
    };

    Ok(Some(SymbolMetrics::new(
        symbol,
        price,
        volume,
        previous_volume,
        gap_percentage,
        relative_volume,
    )))
}

fn require<T>(
    raw: &RawTickerSnapshot,
    field: Option<T>,
    name: &'static str,
) -> Result<T, ScannerError> {
    field.ok_or_else(|| ScannerError::MalformedRecord {
        symbol: raw.symbol.clone(),
        reason: name,
    })
}
