//! Report comparators and selection.

use crate::models::SymbolMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Default: descending by |gap|.
    GapMagnitudeDesc,
    /// Losers: ascending by signed gap (worst first).
    GapAsc,
    /// Volume reports: descending by the intraday ratio when present,
    /// else the daily relative volume.
    RelativeVolumeDesc,
}

/// Sort and truncate a report's entries. `sort_by` is stable, so equal
/// keys keep their input (store first-sighting) order.
pub fn rank(
    mut entries: Vec<SymbolMetrics>,
    sort: SortKey,
    limit: Option<usize>,
) -> Vec<SymbolMetrics> {
    match sort {
        SortKey::GapMagnitudeDesc => entries.sort_by(|a, b| {
            b.gap_percentage
                .abs()
                .total_cmp(&a.gap_percentage.abs())
        }),
        SortKey::GapAsc => {
            entries.sort_by(|a, b| a.gap_percentage.total_cmp(&b.gap_percentage))
        }
        SortKey::RelativeVolumeDesc => {
            entries.sort_by(|a, b| volume_key(b).total_cmp(&volume_key(a)))
        }
    }
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

fn volume_key(metrics: &SymbolMetrics) -> f64 {
    metrics
        .relative_volume_intraday
        .unwrap_or(metrics.relative_volume)
}
