//! First differences: absolute change of close, percent change of volume.

use super::{closes, Indicator};
use crate::domain::Bar;

/// close[t] - close[t-1]. Lookback: 1.
#[derive(Debug, Clone, Default)]
pub struct PriceDiff;

impl Indicator for PriceDiff {
    fn name(&self) -> &str {
        "price_diff"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        diff_of_series(&closes(bars))
    }
}

/// (volume[t] - volume[t-1]) / volume[t-1]. Lookback: 1.
///
/// Undefined (NaN) wherever the previous volume is zero.
#[derive(Debug, Clone, Default)]
pub struct VolumeChange;

impl Indicator for VolumeChange {
    fn name(&self) -> &str {
        "volume_change"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        pct_change_of_series(&volumes)
    }
}

pub fn diff_of_series(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        result[i] = values[i] - values[i - 1];
    }
    result
}

pub fn pct_change_of_series(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        let prev = values[i - 1];
        if prev != 0.0 {
            result[i] = (values[i] - prev) / prev;
        }
    }
    result
}
