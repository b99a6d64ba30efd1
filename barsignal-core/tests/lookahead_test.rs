//! Look-ahead contamination tests for indicators, features and labels.
//!
//! Method: compute on a truncated series (bars 0..100) and on the full series
//! (bars 0..200). Values for bars 0..100 must be identical. Any difference
//! means future data leaked into past values.

use barsignal_core::domain::Bar;
use barsignal_core::indicators::*;
use barsignal_core::{label_rows, FeatureBuilder, FeatureConfig, LabelThresholds};
use chrono::NaiveDate;

/// Deterministic pseudo-random walk with varying volume.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.05;
            price = (price + change).max(10.0);
            Bar::new(
                start + chrono::Duration::minutes(i as i64),
                price,
                1000.0 + ((seed >> 8) % 500) as f64,
            )
        })
        .collect()
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let full = indicator.compute(full_bars);
    let truncated = indicator.compute(&full_bars[..truncated_len]);
    assert_eq!(truncated.len(), truncated_len);
    assert_eq!(full.len(), full_bars.len());

    for i in 0..truncated_len {
        let (t, f) = (truncated[i], full[i]);
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            (t - f).abs() < 1e-10,
            "{}: look-ahead contamination at bar {i}: truncated={t}, full={f}",
            indicator.name()
        );
    }
}

#[test]
fn lookahead_ema() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Ema::new(10), &bars, 100);
    assert_no_lookahead(&Ema::new(21), &bars, 100);
}

#[test]
fn lookahead_rsi() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Rsi::new(14), &bars, 100);
    assert_no_lookahead(&Rsi::new(7), &bars, 100);
}

#[test]
fn lookahead_macd() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Macd::new(10, 21), &bars, 100);
}

#[test]
fn lookahead_diffs() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&PriceDiff, &bars, 100);
    assert_no_lookahead(&VolumeChange, &bars, 100);
}

#[test]
fn lookahead_feature_rows_and_labels() {
    let bars = make_test_bars(200);
    let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
    let thresholds = LabelThresholds::default();

    let full = builder.build(&bars);
    let truncated = builder.build(&bars[..100]);
    assert!(!truncated.is_empty());
    assert_eq!(&full[..truncated.len()], truncated.as_slice());

    let full_labels = label_rows(&full, &thresholds);
    let truncated_labels = label_rows(&truncated, &thresholds);
    assert_eq!(&full_labels[..truncated_labels.len()], truncated_labels.as_slice());
}
