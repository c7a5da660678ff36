//! Classification engine and ranking for the report catalog.

pub mod catalog;
pub mod ranking;
pub mod rules;

pub use catalog::{catalog, definition, ReportDefinition, ReportId};
pub use ranking::SortKey;
pub use rules::{Criterion, ReportRule};

use crate::indicators::TechnicalSnapshot;
use crate::models::SymbolMetrics;
use std::collections::HashMap;

/// Evaluate one report over the tracked universe and return its ranked,
/// truncated entries. Pure over its inputs: running it twice on
/// unchanged data yields identical membership and order.
pub fn build_report(
    definition: &ReportDefinition,
    universe: &[SymbolMetrics],
    technicals: &HashMap<String, TechnicalSnapshot>,
) -> Vec<SymbolMetrics> {
    let entries: Vec<SymbolMetrics> = universe
        .iter()
        .filter(|m| definition.rule.matches(m, technicals.get(&m.symbol)))
        .cloned()
        .collect();
    ranking::rank(entries, definition.sort, definition.limit)
}
