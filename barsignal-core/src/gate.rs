//! Trade gate: is the latest signal actionable right now?
//!
//! A signal is actionable only before the trading cutoff hour (UTC) and at
//! or above the confidence floor. Failing either check blocks the signal;
//! it is never an error.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::LogRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Valid,
    Blocked,
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateStatus::Valid => f.write_str("VALID"),
            GateStatus::Blocked => f.write_str("BLOCKED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub valid_time: bool,
    pub confident: bool,
    pub status: GateStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeGate {
    /// Exclusive upper bound on the UTC hour of day.
    pub trading_end_hour: u32,
    /// Inclusive lower bound on confidence, in percent.
    pub min_confidence: f64,
}

impl TradeGate {
    pub fn new(trading_end_hour: u32, min_confidence: f64) -> Self {
        Self {
            trading_end_hour,
            min_confidence,
        }
    }

    pub fn evaluate(&self, latest: &LogRow, now: DateTime<Utc>) -> TradeDecision {
        let valid_time = now.hour() < self.trading_end_hour;
        let confident = latest.confidence >= self.min_confidence;
        let status = if valid_time && confident {
            GateStatus::Valid
        } else {
            GateStatus::Blocked
        };
        TradeDecision {
            valid_time,
            confident,
            status,
        }
    }

    /// Evaluate the most recent row by timestamp, if any.
    pub fn evaluate_latest(&self, rows: &[LogRow], now: DateTime<Utc>) -> Option<TradeDecision> {
        rows.iter()
            .max_by_key(|r| r.timestamp)
            .map(|latest| self.evaluate(latest, now))
    }
}
