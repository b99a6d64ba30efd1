//! End-to-end scenarios over the in-memory pipeline:
//! features → labels → split → fit → predict → gate.

use barsignal_core::domain::{Bar, Label, LogRow};
use barsignal_core::{
    feature_matrix, label_rows, latest_log_rows, predict_signals, Evaluation, FeatureBuilder,
    FeatureConfig, GateStatus, GbdtParams, GradientBoostedClassifier, LabelCounts,
    LabelThresholds, TimeSplit, TradeGate,
};
use chrono::{NaiveDate, TimeZone, Utc};

fn bars_from(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Bar::new(
                start + chrono::Duration::minutes(i as i64),
                c,
                500.0 + 10.0 * i as f64,
            )
        })
        .collect()
}

/// 30 bars drifting up 0.5 per bar with alternating ±1 pullbacks.
///
/// Every 14-change window holds 7 moves of +2.5 and 7 of -1.5, so RSI sits
/// at 62.5 (below 70) while the fast EMA stays above the slow one.
fn rising_with_pullbacks() -> Vec<f64> {
    (0..30)
        .map(|i| 100.0 + 0.5 * i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 })
        .collect()
}

#[test]
fn uptrend_yields_majority_buy_labels() {
    let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
    let rows = builder.build(&bars_from(&rising_with_pullbacks()));
    assert_eq!(rows.len(), 16);

    for row in &rows {
        assert!(row.features.ema_fast > row.features.ema_slow);
        assert!((row.features.rsi - 62.5).abs() < 1e-9);
    }

    let labels = label_rows(&rows, &LabelThresholds::default());
    let counts = LabelCounts::from_labels(&labels);
    assert!(counts.buy * 2 > counts.total(), "counts: {counts:?}");
}

#[test]
fn strictly_increasing_closes_saturate_rsi() {
    // With no down moves RSI is pinned at 100, so the overbought guard turns
    // every row into HOLD even though the EMAs are in BUY order.
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
    let rows = builder.build(&bars_from(&closes));
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r.features.rsi == 100.0));
    let labels = label_rows(&rows, &LabelThresholds::default());
    assert!(labels.iter().all(|l| *l == Label::Hold));
}

#[test]
fn full_in_memory_run_produces_bounded_signals() {
    // Up leg, then down leg, so both BUY and SELL appear.
    let mut closes = Vec::new();
    for i in 0..60 {
        closes.push(100.0 + 0.5 * i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 });
    }
    for i in 0..60 {
        closes.push(130.0 - 0.5 * i as f64 + if i % 2 == 0 { -1.0 } else { 1.0 });
    }
    let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
    let rows = builder.build(&bars_from(&closes));
    let labels = label_rows(&rows, &LabelThresholds::default());
    let x = feature_matrix(&rows);

    let split = TimeSplit::new(rows.len(), 0.2);
    let model = GradientBoostedClassifier::fit(
        &x[split.train.clone()],
        &labels[split.train.clone()],
        &GbdtParams::default(),
    )
    .unwrap();
    let eval = Evaluation::score(
        &model,
        split.n_train(),
        &x[split.test.clone()],
        &labels[split.test.clone()],
    );
    assert_eq!(eval.n_test, split.n_test());
    assert!(eval.accuracy.is_some());

    let signals = predict_signals(&model, &rows);
    assert_eq!(signals.len(), rows.len());
    assert!(signals.iter().all(|s| (0.0..=100.0).contains(&s.confidence)));

    // In-sample rows of a clean trend are reproduced.
    let train_hits = signals[split.train.clone()]
        .iter()
        .zip(&labels[split.train.clone()])
        .filter(|(s, l)| s.label == **l)
        .count();
    assert!(train_hits * 10 >= split.n_train() * 9);

    let log = latest_log_rows(&rows, &signals, 10);
    assert_eq!(log.len(), 10);
    assert_eq!(log.last().unwrap().timestamp, rows.last().unwrap().bar.timestamp);
}

#[test]
fn low_confidence_sell_is_blocked_at_any_hour() {
    let row = LogRow {
        timestamp: NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        signal: Label::Sell,
        confidence: 55.0,
        price: 100.0,
    };
    let gate = TradeGate::new(20, 60.0);
    for hour in 0..24 {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap();
        let d = gate.evaluate(&row, now);
        assert!(!d.confident);
        assert_eq!(d.status, GateStatus::Blocked);
    }
}
