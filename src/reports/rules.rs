//! Declarative report criteria.
//!
//! Every criterion is pure and total: it returns a definite boolean for
//! any valid [`SymbolMetrics`], with unknown optional fields failing
//! numeric thresholds rather than erroring.

use crate::indicators::TechnicalSnapshot;
use crate::models::SymbolMetrics;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    /// relative_volume >= floor (percent, 100 = average).
    RelativeVolumeAtLeast(f64),
    /// Signed gap >= floor.
    GapAtLeast(f64),
    /// |gap| >= floor.
    GapMagnitudeAtLeast(f64),
    /// Signed gap < 0.
    GapBelowZero,
    HasNews,
    /// price within [low, high], inclusive.
    PriceBetween(f64, f64),
    /// Float below the ceiling; when float is unknown, today's volume
    /// stands in as a weaker supply proxy against the same ceiling.
    SupplyBelow(u64),
    /// Real indicator read when a technical snapshot exists for the
    /// symbol, otherwise a gap/relative-volume/price proxy.
    TechnicalUptrend {
        proxy_min_gap: f64,
        proxy_min_relative_volume: f64,
        proxy_min_price: f64,
    },
}

impl Criterion {
    pub fn is_met(&self, metrics: &SymbolMetrics, technicals: Option<&TechnicalSnapshot>) -> bool {
        match *self {
            Criterion::RelativeVolumeAtLeast(floor) => metrics.relative_volume >= floor,
            Criterion::GapAtLeast(floor) => metrics.gap_percentage >= floor,
            Criterion::GapMagnitudeAtLeast(floor) => metrics.gap_percentage.abs() >= floor,
            Criterion::GapBelowZero => metrics.gap_percentage < 0.0,
            Criterion::HasNews => metrics.has_news,
            Criterion::PriceBetween(low, high) => {
                metrics.price >= low && metrics.price <= high
            }
            Criterion::SupplyBelow(ceiling) => {
                metrics.float_shares.unwrap_or(metrics.volume) < ceiling
            }
            Criterion::TechnicalUptrend {
                proxy_min_gap,
                proxy_min_relative_volume,
                proxy_min_price,
            } => match technicals {
                Some(snapshot) => snapshot.indicates_uptrend(),
                None => {
                    metrics.gap_percentage >= proxy_min_gap
                        && metrics.relative_volume >= proxy_min_relative_volume
                        && metrics.price >= proxy_min_price
                }
            },
        }
    }
}

/// How a report decides membership.
#[derive(Debug, Clone)]
pub enum ReportRule {
    /// Every admitted symbol belongs.
    All,
    /// Conjunction: all criteria must hold.
    Strict(Vec<Criterion>),
    /// Fuzzy AND: at least `min_met` of the named criteria must hold.
    ThresholdCount {
        criteria: Vec<Criterion>,
        min_met: usize,
    },
}

impl ReportRule {
    pub fn matches(&self, metrics: &SymbolMetrics, technicals: Option<&TechnicalSnapshot>) -> bool {
        match self {
            ReportRule::All => true,
            ReportRule::Strict(criteria) => {
                criteria.iter().all(|c| c.is_met(metrics, technicals))
            }
            ReportRule::ThresholdCount { criteria, min_met } => {
                criteria
                    .iter()
                    .filter(|c| c.is_met(metrics, technicals))
                    .count()
                    >= *min_met
            }
        }
    }
}
