//! Signal prediction over feature rows.
//!
//! Predictions cover every retained row, training rows included. They are
//! in-sample for the leading segment, not a validated out-of-sample signal.

use crate::domain::{LogRow, Signal};
use crate::features::FeatureRow;
use crate::model::{Classifier, FeatureArray};

/// Feature rows as model input.
pub fn feature_matrix(rows: &[FeatureRow]) -> Vec<FeatureArray> {
    rows.iter().map(|r| r.features.as_array()).collect()
}

/// One signal per row: argmax label, confidence = max probability × 100.
pub fn predict_signals(model: &dyn Classifier, rows: &[FeatureRow]) -> Vec<Signal> {
    rows.iter()
        .map(|row| {
            let (label, probability) = model.predict(&row.features.as_array());
            Signal::from_probability(label, probability)
        })
        .collect()
}

/// Pair the last `window` rows with their signals as log rows.
pub fn latest_log_rows(rows: &[FeatureRow], signals: &[Signal], window: usize) -> Vec<LogRow> {
    let n = rows.len().min(signals.len());
    let start = n.saturating_sub(window);
    rows[start..n]
        .iter()
        .zip(&signals[start..n])
        .map(|(row, signal)| LogRow {
            timestamp: row.bar.timestamp,
            signal: signal.label,
            confidence: signal.confidence,
            price: row.bar.close,
        })
        .collect()
}
