//! Unit tests for the snapshot normalizer

use gapscan::error::ScannerError;
use gapscan::models::RawTickerSnapshot;
use gapscan::pipeline::normalizer::{normalize, MIN_DAILY_VOLUME, NEUTRAL_RELATIVE_VOLUME};

fn raw(symbol: &str, volume: u64, close: f64, gap: f64, prior_volume: u64) -> RawTickerSnapshot {
    RawTickerSnapshot {
        symbol: symbol.to_string(),
        today_open: Some(close - 0.5),
        today_close: Some(close),
        today_high: Some(close + 0.5),
        today_low: Some(close - 1.0),
        today_volume: Some(volume),
        prior_close: Some(close / (1.0 + gap / 100.0)),
        prior_volume: Some(prior_volume),
        percent_change_today: Some(gap),
    }
}

#[test]
fn volume_at_floor_is_dropped() {
    let result = normalize(&raw("ABCD", MIN_DAILY_VOLUME, 10.0, 8.0, 10_000)).unwrap();
    assert!(result.is_none());
}

#[test]
fn volume_one_above_floor_is_admitted() {
    let result = normalize(&raw("ABCD", MIN_DAILY_VOLUME + 1, 10.0, 8.0, 10_000)).unwrap();
    assert!(result.is_some());
}

#[test]
fn gap_at_threshold_is_dropped() {
    assert!(normalize(&raw("ABCD", 100_000, 10.0, 3.0, 10_000))
        .unwrap()
        .is_none());
    assert!(normalize(&raw("ABCD", 100_000, 10.0, -3.0, 10_000))
        .unwrap()
        .is_none());
}

#[test]
fn gap_just_past_threshold_is_admitted() {
    assert!(normalize(&raw("ABCD", 100_000, 10.0, 3.01, 10_000))
        .unwrap()
        .is_some());
    assert!(normalize(&raw("ABCD", 100_000, 10.0, -3.01, 10_000))
        .unwrap()
        .is_some());
}

#[test]
fn gap_is_taken_verbatim_from_the_source() {
    let metrics = normalize(&raw("ABCD", 100_000, 10.0, 12.34, 10_000))
        .unwrap()
        .unwrap();
    assert_eq!(metrics.gap_percentage, 12.34);
}

#[test]
fn relative_volume_is_percentage_of_prior_session() {
    let metrics = normalize(&raw("ABCD", 60_000, 10.0, 4.0, 10_000))
        .unwrap()
        .unwrap();
    assert_eq!(metrics.relative_volume, 600.0);
}

#[test]
fn zero_prior_volume_defaults_to_neutral() {
    let metrics = normalize(&raw("ABCD", 60_000, 10.0, 4.0, 0))
        .unwrap()
        .unwrap();
    assert_eq!(metrics.relative_volume, NEUTRAL_RELATIVE_VOLUME);
}

#[test]
fn missing_prior_volume_defaults_to_neutral() {
    let mut record = raw("ABCD", 60_000, 10.0, 4.0, 0);
    record.prior_volume = None;
    let metrics = normalize(&record).unwrap().unwrap();
    assert_eq!(metrics.previous_volume, 0);
    assert_eq!(metrics.relative_volume, NEUTRAL_RELATIVE_VOLUME);
}

#[test]
fn missing_required_fields_are_malformed() {
    let mut record = raw("ABCD", 100_000, 10.0, 8.0, 10_000);
    record.today_volume = None;
    assert!(matches!(
        normalize(&record),
        Err(ScannerError::MalformedRecord { .. })
    ));

    let mut record = raw("ABCD", 100_000, 10.0, 8.0, 10_000);
    record.today_close = None;
    assert!(matches!(
        normalize(&record),
        Err(ScannerError::MalformedRecord { .. })
    ));

    let mut record = raw("ABCD", 100_000, 10.0, 8.0, 10_000);
    record.percent_change_today = None;
    assert!(matches!(
        normalize(&record),
        Err(ScannerError::MalformedRecord { .. })
    ));
}

#[test]
fn empty_symbol_is_malformed() {
    assert!(matches!(
        normalize(&raw("  ", 100_000, 10.0, 8.0, 10_000)),
        Err(ScannerError::MalformedRecord { .. })
    ));
}

#[test]
fn symbol_is_uppercased() {
    let metrics = normalize(&raw("abcd", 100_000, 10.0, 8.0, 10_000))
        .unwrap()
        .unwrap();
    assert_eq!(metrics.symbol, "ABCD");
}
