//! Bar: one intraday price/volume observation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Close/volume bar at a single timestamp.
///
/// Bars are read once from the source and never mutated afterwards; derived
/// features live beside the bar in [`crate::features::FeatureRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: NaiveDateTime, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            close,
            volume,
        }
    }

    /// Returns true if close or volume is NaN.
    pub fn is_void(&self) -> bool {
        self.close.is_nan() || self.volume.is_nan()
    }

    /// Positive finite close, non-negative finite volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.close.is_finite() && self.close > 0.0 && self.volume.is_finite() && self.volume >= 0.0
    }
}
