//! MACD line: fast EMA minus slow EMA of close.

use super::ema::ema_of_series;
use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Macd {
    fast_span: usize,
    slow_span: usize,
    name: String,
}

impl Macd {
    pub fn new(fast_span: usize, slow_span: usize) -> Self {
        assert!(fast_span >= 1, "fast_span must be >= 1");
        assert!(slow_span > fast_span, "slow_span must be > fast_span");
        Self {
            fast_span,
            slow_span,
            name: format!("macd_{fast_span}_{slow_span}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let fast = ema_of_series(&closes, self.fast_span);
        let slow = ema_of_series(&closes, self.slow_span);
        macd_line(&fast, &slow)
    }
}

/// Element-wise `fast - slow`.
pub fn macd_line(fast: &[f64], slow: &[f64]) -> Vec<f64> {
    fast.iter().zip(slow).map(|(f, s)| f - s).collect()
}
