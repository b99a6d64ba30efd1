//! Model output per bar and its persisted log form.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Label;

/// Predicted label plus the winning class probability as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub label: Label,
    /// Always within [0, 100].
    pub confidence: f64,
}

impl Signal {
    /// Build a signal from a class probability in [0, 1].
    pub fn from_probability(label: Label, probability: f64) -> Self {
        Self {
            label,
            confidence: (probability * 100.0).clamp(0.0, 100.0),
        }
    }
}

/// One row of the signal log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub timestamp: NaiveDateTime,
    pub signal: Label,
    pub confidence: f64,
    pub price: f64,
}
