//! Property tests for feature, label, confidence and gate invariants.
//!
//! Uses proptest to verify:
//! 1. RSI is NaN or within [0, 100]
//! 2. No retained feature row has an undefined value
//! 3. Labels are a pure function of (ema_fast, ema_slow, rsi); BUY and SELL never coincide
//! 4. Confidence is always within [0, 100]
//! 5. The gate is VALID iff hour < cutoff and confidence >= floor

use barsignal_core::domain::{Bar, Label, LogRow};
use barsignal_core::indicators::rsi::rsi_of_series;
use barsignal_core::{
    feature_matrix, label_for, label_rows, predict_signals, FeatureBuilder, FeatureConfig,
    FeatureVector, GateStatus, GbdtParams, GradientBoostedClassifier, LabelThresholds, TradeGate,
};
use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 0..max_len)
}

fn arb_bars(max_len: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((1.0..500.0_f64, 0.0..10_000.0_f64), 0..max_len).prop_map(|raw| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        raw.into_iter()
            .enumerate()
            .map(|(i, (close, volume))| {
                // Round volume so exact zeros show up.
                Bar::new(
                    start + chrono::Duration::minutes(i as i64),
                    close,
                    (volume / 500.0).floor(),
                )
            })
            .collect()
    })
}

fn arb_features() -> impl Strategy<Value = FeatureVector> {
    (50.0..150.0_f64, 50.0..150.0_f64, 0.0..=100.0_f64).prop_map(|(fast, slow, rsi)| {
        FeatureVector {
            ema_fast: fast,
            ema_slow: slow,
            rsi,
            macd: fast - slow,
            price_diff: 0.0,
            volume_change: 0.0,
        }
    })
}

// ── 1. RSI bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_nan_or_bounded(closes in arb_closes(120), period in 1usize..30) {
        for (i, v) in rsi_of_series(&closes, period).into_iter().enumerate() {
            prop_assert!(v.is_nan() || (0.0..=100.0).contains(&v), "rsi[{}] = {}", i, v);
            if i < period {
                prop_assert!(v.is_nan());
            }
        }
    }
}

// ── 2. Post-drop completeness ────────────────────────────────────────

proptest! {
    #[test]
    fn retained_rows_are_complete(bars in arb_bars(80)) {
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        let rows = builder.build(&bars);
        prop_assert!(rows.len() <= bars.len().saturating_sub(builder.warmup_bars()));
        for row in &rows {
            prop_assert!(row.features.as_array().iter().all(|v| v.is_finite()));
        }
    }
}

// ── 3. Label purity and exclusivity ──────────────────────────────────

proptest! {
    #[test]
    fn labels_are_pure(f in arb_features(), noise in -1e6..1e6_f64) {
        let t = LabelThresholds::default();
        let mut other = f;
        // Columns the rule does not read must not matter.
        other.price_diff = noise;
        other.volume_change = -noise;
        other.macd = noise;
        prop_assert_eq!(label_for(&f, &t), label_for(&other, &t));
    }

    #[test]
    fn buy_and_sell_are_exclusive(f in arb_features()) {
        let t = LabelThresholds::default();
        let buy = f.ema_fast > f.ema_slow && f.rsi < t.overbought;
        let sell = f.ema_fast < f.ema_slow && f.rsi > t.oversold;
        prop_assert!(!(buy && sell));
        let expected = if buy { Label::Buy } else if sell { Label::Sell } else { Label::Hold };
        prop_assert_eq!(label_for(&f, &t), expected);
    }
}

// ── 4. Confidence bounds ─────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn confidence_is_bounded(bars in arb_bars(90)) {
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        let rows = builder.build(&bars);
        prop_assume!(!rows.is_empty());
        let labels = label_rows(&rows, &LabelThresholds::default());
        let params = GbdtParams {
            n_estimators: 10,
            ..Default::default()
        };
        let model =
            GradientBoostedClassifier::fit(&feature_matrix(&rows), &labels, &params).unwrap();
        for signal in predict_signals(&model, &rows) {
            prop_assert!((0.0..=100.0).contains(&signal.confidence));
        }
    }
}

// ── 5. Gate equivalence ──────────────────────────────────────────────

proptest! {
    #[test]
    fn gate_status_equivalence(
        hour in 0u32..24,
        end_hour in 0u32..=24,
        confidence in 0.0..=100.0_f64,
        floor in 0.0..=100.0_f64,
    ) {
        let row = LogRow {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap(),
            signal: Label::Hold,
            confidence,
            price: 1.0,
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 2, hour, 0, 0).unwrap();
        let d = TradeGate::new(end_hour, floor).evaluate(&row, now);
        let expected = hour < end_hour && confidence >= floor;
        prop_assert_eq!(d.status == GateStatus::Valid, expected);
        prop_assert_eq!(d.valid_time, hour < end_hour);
        prop_assert_eq!(d.confident, confidence >= floor);
    }
}
