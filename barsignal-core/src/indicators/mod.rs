//! Indicator trait and concrete indicator implementations.
//!
//! Indicators are pure functions: bar history in, numeric series of the same
//! length out. Values that cannot be computed yet (warm-up) or at all
//! (division by zero) are `f64::NAN`.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on data from bar t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod diff;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use diff::{PriceDiff, VolumeChange};
pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;

use crate::domain::Bar;

/// Trait for indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_10", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars that are always `NaN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

pub(crate) fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Create synthetic bars from close prices for testing.
///
/// One bar per minute starting 2024-01-02 09:30, volume = 1000 + index.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            Bar::new(
                start + chrono::Duration::minutes(i as i64),
                close,
                1000.0 + i as f64,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
