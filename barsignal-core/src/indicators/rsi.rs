//! Relative Strength Index (RSI).
//!
//! Average gain and average loss are simple rolling means over the trailing
//! `period` close-to-close changes (no Wilder smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → NaN.

use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        rsi_of_series(&closes(bars), self.period)
    }
}

/// RSI over an arbitrary series. Indices `< period` are NaN.
pub fn rsi_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let changes: Vec<f64> = (1..n).map(|i| values[i] - values[i - 1]).collect();

    // changes[j] is the move into bar j + 1
    for i in period..n {
        let window = &changes[i - period..i];
        if window.iter().any(|c| c.is_nan()) {
            continue;
        }
        let gain: f64 = window.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
        let loss: f64 = -window.iter().filter(|&&c| c < 0.0).sum::<f64>() / period as f64;
        result[i] = compute_rsi(gain, loss);
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
