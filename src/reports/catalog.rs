//! The fixed report catalog.

use serde::{Deserialize, Serialize};

use super::ranking::SortKey;
use super::rules::{Criterion, ReportRule};

/// Flagship high-demand/low-supply report: at least K of N criteria.
pub const FLAGSHIP_MIN_CRITERIA: usize = 3;
/// 5x the prior session's volume, as a percentage.
pub const FLAGSHIP_RELATIVE_VOLUME_FLOOR: f64 = 500.0;
pub const FLAGSHIP_GAP_FLOOR: f64 = 10.0;
pub const FLAGSHIP_PRICE_LOW: f64 = 1.0;
pub const FLAGSHIP_PRICE_HIGH: f64 = 20.0;
pub const FLAGSHIP_SUPPLY_CEILING: u64 = 10_000_000;

pub const PENNY_PRICE_LOW: f64 = 0.01;
pub const PENNY_PRICE_HIGH: f64 = 5.0;
pub const PENNY_GAP_MAGNITUDE_FLOOR: f64 = 10.0;

pub const TREND_PROXY_MIN_GAP: f64 = 5.0;
pub const TREND_PROXY_MIN_RELATIVE_VOLUME: f64 = 200.0;
pub const TREND_PROXY_MIN_PRICE: f64 = 1.0;

pub const VOLUME_MOVERS_FLOOR: f64 = 300.0;

/// The unfiltered view is truncated; category reports are not.
pub const TOP_GAPPERS_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportId {
    TopGappers,
    TopLosers,
    MoysTopGappers,
    PennyGappers,
    RsiTrend,
    VolumeMovers,
}

impl ReportId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportId::TopGappers => "top-gappers",
            ReportId::TopLosers => "top-losers",
            ReportId::MoysTopGappers => "moys-top-gappers",
            ReportId::PennyGappers => "penny-gappers",
            ReportId::RsiTrend => "rsi-trend",
            ReportId::VolumeMovers => "volume-movers",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::all().into_iter().find(|id| id.as_str() == raw)
    }

    pub fn all() -> [ReportId; 6] {
        [
            ReportId::TopGappers,
            ReportId::TopLosers,
            ReportId::MoysTopGappers,
            ReportId::PennyGappers,
            ReportId::RsiTrend,
            ReportId::VolumeMovers,
        ]
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ReportDefinition {
    pub id: ReportId,
    pub display_name: &'static str,
    pub rule: ReportRule,
    pub sort: SortKey,
    pub limit: Option<usize>,
}

/// Build the definition for one report id.
pub fn definition(id: ReportId) -> ReportDefinition {
    match id {
        ReportId::TopGappers => ReportDefinition {
            id,
            display_name: "Top Gappers",
            rule: ReportRule::All,
            sort: SortKey::GapMagnitudeDesc,
            limit: Some(TOP_GAPPERS_LIMIT),
        },
        ReportId::TopLosers => ReportDefinition {
            id,
            display_name: "Top Losers",
            rule: ReportRule::Strict(vec![Criterion::GapBelowZero]),
            sort: SortKey::GapAsc,
            limit: None,
        },
        ReportId::MoysTopGappers => ReportDefinition {
            id,
            display_name: "Moys Top Gappers",
            rule: ReportRule::ThresholdCount {
                criteria: vec![
                    Criterion::RelativeVolumeAtLeast(FLAGSHIP_RELATIVE_VOLUME_FLOOR),
                    Criterion::GapAtLeast(FLAGSHIP_GAP_FLOOR),
                    Criterion::HasNews,
                    Criterion::PriceBetween(FLAGSHIP_PRICE_LOW, FLAGSHIP_PRICE_HIGH),
                    Criterion::SupplyBelow(FLAGSHIP_SUPPLY_CEILING),
                ],
                min_met: FLAGSHIP_MIN_CRITERIA,
            },
            sort: SortKey::GapMagnitudeDesc,
            limit: None,
        },
        ReportId::PennyGappers => ReportDefinition {
            id,
            display_name: "Penny Gappers",
            rule: ReportRule::Strict(vec![
                Criterion::PriceBetween(PENNY_PRICE_LOW, PENNY_PRICE_HIGH),
                Criterion::GapMagnitudeAtLeast(PENNY_GAP_MAGNITUDE_FLOOR),
            ]),
            sort: SortKey::GapMagnitudeDesc,
            limit: None,
        },
        ReportId::RsiTrend => ReportDefinition {
            id,
            display_name: "RSI Trend",
            rule: ReportRule::Strict(vec![Criterion::TechnicalUptrend {
                proxy_min_gap: TREND_PROXY_MIN_GAP,
                proxy_min_relative_volume: TREND_PROXY_MIN_RELATIVE_VOLUME,
                proxy_min_price: TREND_PROXY_MIN_PRICE,
            }]),
            sort: SortKey::GapMagnitudeDesc,
            limit: None,
        },
        ReportId::VolumeMovers => ReportDefinition {
            id,
            display_name: "Volume Movers",
            rule: ReportRule::Strict(vec![Criterion::RelativeVolumeAtLeast(
                VOLUME_MOVERS_FLOOR,
            )]),
            sort: SortKey::RelativeVolumeDesc,
            limit: None,
        },
    }
}

/// Full catalog in display order.
pub fn catalog() -> Vec<ReportDefinition> {
    ReportId::all().into_iter().map(definition).collect()
}
