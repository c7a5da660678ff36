//! Unit tests for report criteria and the catalog

use gapscan::models::SymbolMetrics;
use gapscan::reports::{build_report, definition, Criterion, ReportId, ReportRule};
use std::collections::HashMap;

fn metrics(symbol: &str, gap: f64, relative_volume: f64, price: f64) -> SymbolMetrics {
    SymbolMetrics::new(symbol, price, 100_000, 20_000, gap, relative_volume)
}

fn flagship_criteria() -> Vec<Criterion> {
    vec![
        Criterion::RelativeVolumeAtLeast(500.0),
        Criterion::GapAtLeast(10.0),
        Criterion::HasNews,
        Criterion::PriceBetween(1.0, 20.0),
        Criterion::SupplyBelow(10_000_000),
    ]
}

#[test]
fn threshold_count_admits_at_the_minimum() {
    let rule = ReportRule::ThresholdCount {
        criteria: flagship_criteria(),
        min_met: 3,
    };

    // Meets relative volume, gap, and price. No news, and volume stands
    // in for the unknown float at 100,000 shares, which passes supply
    // too, so drop it below by inflating volume.
    let mut three = metrics("AAA", 12.0, 600.0, 10.0);
    three.volume = 50_000_000;
    assert!(rule.matches(&three, None));

    // Only relative volume and gap.
    let mut two = metrics("BBB", 12.0, 600.0, 50.0);
    two.volume = 50_000_000;
    assert!(!rule.matches(&two, None));
}

#[test]
fn strict_rule_requires_every_criterion() {
    let rule = ReportRule::Strict(vec![
        Criterion::PriceBetween(0.01, 5.0),
        Criterion::GapMagnitudeAtLeast(10.0),
    ]);
    assert!(rule.matches(&metrics("AAA", -12.0, 100.0, 2.5), None));
    assert!(!rule.matches(&metrics("BBB", -12.0, 100.0, 7.0), None));
    assert!(!rule.matches(&metrics("CCC", 8.0, 100.0, 2.5), None));
}

#[test]
fn supply_criterion_falls_back_to_volume() {
    let criterion = Criterion::SupplyBelow(10_000_000);

    let mut unknown_float = metrics("AAA", 5.0, 100.0, 10.0);
    unknown_float.volume = 9_999_999;
    assert!(criterion.is_met(&unknown_float, None));
    unknown_float.volume = 10_000_000;
    assert!(!criterion.is_met(&unknown_float, None));

    let known_float = metrics("BBB", 5.0, 100.0, 10.0).with_float_shares(2_000_000);
    assert!(criterion.is_met(&known_float, None));
    let large_float = metrics("CCC", 5.0, 100.0, 10.0).with_float_shares(50_000_000);
    assert!(!criterion.is_met(&large_float, None));
}

#[test]
fn uptrend_proxy_applies_without_technicals() {
    let criterion = Criterion::TechnicalUptrend {
        proxy_min_gap: 5.0,
        proxy_min_relative_volume: 200.0,
        proxy_min_price: 1.0,
    };
    assert!(criterion.is_met(&metrics("AAA", 6.0, 250.0, 3.0), None));
    assert!(!criterion.is_met(&metrics("BBB", 4.0, 250.0, 3.0), None));
    assert!(!criterion.is_met(&metrics("CCC", 6.0, 150.0, 3.0), None));
}

#[test]
fn flagship_membership_with_four_of_five() {
    // Gap of 4 misses the 10 floor but relative volume, news, price, and
    // supply all hold.
    let candidate = metrics("GAPR", 4.0, 600.0, 10.0)
        .with_float_shares(2_000_000)
        .with_news(1);

    let def = definition(ReportId::MoysTopGappers);
    let entries = build_report(&def, &[candidate], &HashMap::new());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].symbol, "GAPR");
}

#[test]
fn losers_report_excludes_positive_gaps() {
    let universe = vec![
        metrics("UPUP", 8.0, 100.0, 10.0),
        metrics("DOWN", -6.0, 100.0, 10.0),
        metrics("DIVE", -9.0, 100.0, 10.0),
    ];
    let def = definition(ReportId::TopLosers);
    let entries = build_report(&def, &universe, &HashMap::new());
    let symbols: Vec<&str> = entries.iter().map(|m| m.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["DIVE", "DOWN"]);
}

#[test]
fn classification_is_idempotent() {
    let universe = vec![
        metrics("AAA", 12.0, 600.0, 10.0).with_news(2),
        metrics("BBB", -7.0, 150.0, 3.0),
        metrics("CCC", 5.5, 320.0, 1.5),
    ];
    let technicals = HashMap::new();
    for def in gapscan::reports::catalog() {
        let first = build_report(&def, &universe, &technicals);
        let second = build_report(&def, &universe, &technicals);
        let first_symbols: Vec<&str> = first.iter().map(|m| m.symbol.as_str()).collect();
        let second_symbols: Vec<&str> = second.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(first_symbols, second_symbols, "report {}", def.id);
    }
}

#[test]
fn report_ids_parse_their_slugs() {
    for id in ReportId::all() {
        assert_eq!(ReportId::parse(id.as_str()), Some(id));
    }
    assert_eq!(ReportId::parse("no-such-report"), None);
}
