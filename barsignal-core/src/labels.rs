//! Rule-based labeling of feature rows.
//!
//! Each row is labeled from its own (ema_fast, ema_slow, rsi) only: no
//! look-ahead and no smoothing across rows. BUY requires ema_fast > ema_slow
//! and SELL requires ema_fast < ema_slow, so no row can satisfy both.

use serde::{Deserialize, Serialize};

use crate::domain::Label;
use crate::features::{FeatureRow, FeatureVector};

/// RSI bounds used by the labeling rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    /// BUY only while RSI is strictly below this.
    pub overbought: f64,
    /// SELL only while RSI is strictly above this.
    pub oversold: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

pub fn label_for(features: &FeatureVector, thresholds: &LabelThresholds) -> Label {
    if features.ema_fast > features.ema_slow && features.rsi < thresholds.overbought {
        Label::Buy
    } else if features.ema_fast < features.ema_slow && features.rsi > thresholds.oversold {
        Label::Sell
    } else {
        Label::Hold
    }
}

pub fn label_rows(rows: &[FeatureRow], thresholds: &LabelThresholds) -> Vec<Label> {
    rows.iter()
        .map(|row| label_for(&row.features, thresholds))
        .collect()
}

/// Occurrences of each label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl LabelCounts {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a Label>) -> Self {
        let mut counts = Self::default();
        for label in labels {
            counts.add(*label);
        }
        counts
    }

    pub fn add(&mut self, label: Label) {
        match label {
            Label::Buy => self.buy += 1,
            Label::Sell => self.sell += 1,
            Label::Hold => self.hold += 1,
        }
    }

    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::Buy => self.buy,
            Label::Sell => self.sell,
            Label::Hold => self.hold,
        }
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell + self.hold
    }
}
