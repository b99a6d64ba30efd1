//! Read-only view of the signal log for display surfaces.
//!
//! Current status, recent history (newest first), a confidence histogram
//! and per-label counts. Pure function of the log rows, the gate and the
//! clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use barsignal_core::{LabelCounts, LogRow, TradeDecision, TradeGate};

/// Rows shown in the recent-history table.
pub const RECENT_ROWS: usize = 20;

/// Histogram buckets of width 10 over [0, 100]; 100 falls in the last one.
pub const CONFIDENCE_BUCKETS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub latest: Option<LogRow>,
    pub decision: Option<TradeDecision>,
    /// Newest first.
    pub recent: Vec<LogRow>,
    /// `confidence_histogram[i]` counts rows with confidence in [10i, 10i+10).
    pub confidence_histogram: [usize; CONFIDENCE_BUCKETS],
    pub label_counts: LabelCounts,
}

impl LogSummary {
    pub fn from_rows(rows: &[LogRow], gate: &TradeGate, now: DateTime<Utc>) -> Self {
        let mut recent: Vec<LogRow> = rows.to_vec();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let latest = recent.first().cloned();
        let decision = latest.as_ref().map(|row| gate.evaluate(row, now));
        recent.truncate(RECENT_ROWS);

        let mut confidence_histogram = [0; CONFIDENCE_BUCKETS];
        for row in rows {
            confidence_histogram[bucket(row.confidence)] += 1;
        }

        Self {
            latest,
            decision,
            recent,
            confidence_histogram,
            label_counts: LabelCounts::from_labels(rows.iter().map(|r| &r.signal)),
        }
    }
}

fn bucket(confidence: f64) -> usize {
    let clamped = confidence.clamp(0.0, 100.0);
    ((clamped / 10.0).floor() as usize).min(CONFIDENCE_BUCKETS - 1)
}
