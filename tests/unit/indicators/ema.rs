//! Unit tests for EMA and SMA

use gapscan::indicators::ema::{ema, ema_series};
use gapscan::indicators::sma::sma;

#[test]
fn ema_seed_is_simple_average_of_first_period() {
    let values = [1.0, 2.0, 3.0, 4.0];
    let series = ema_series(&values, 3).unwrap();
    assert_eq!(series[0], 2.0);
}

#[test]
fn ema_of_constant_series_is_constant() {
    let values = vec![5.0; 30];
    let value = ema(&values, 12).unwrap();
    assert!((value - 5.0).abs() < 1e-9);
}

#[test]
fn ema_requires_period_values() {
    assert!(ema(&[1.0, 2.0], 3).is_none());
}

#[test]
fn ema_tracks_rising_series_below_latest() {
    let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let value = ema(&values, 12).unwrap();
    let last = *values.last().unwrap();
    assert!(value < last);
    assert!(value > values[0]);
}

#[test]
fn sma_uses_last_period_closes() {
    let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(sma(&closes, 2), Some(4.5));
}

#[test]
fn sma_falls_back_to_all_available() {
    let closes = [2.0, 4.0];
    assert_eq!(sma(&closes, 20), Some(3.0));
}

#[test]
fn sma_of_empty_is_unavailable() {
    assert!(sma(&[], 5).is_none());
}
