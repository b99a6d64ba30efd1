//! Feature builder: bars in, fully-defined feature rows out.
//!
//! All indicator series are precomputed over the full bar history, then any
//! row with a non-finite feature is dropped. Every row that leaves this
//! module has a complete feature vector.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;
use crate::indicators::macd::macd_line;
use crate::indicators::{Ema, Indicator, PriceDiff, Rsi, VolumeChange};

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 6;

/// Column names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "ema_fast",
    "ema_slow",
    "rsi",
    "macd",
    "price_diff",
    "volume_change",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("ema spans must satisfy 1 <= fast < slow (got fast={fast}, slow={slow})")]
    InvalidSpans { fast: usize, slow: usize },

    #[error("rsi period must be >= 1")]
    InvalidRsiPeriod,
}

/// Indicator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub ema_fast_span: usize,
    pub ema_slow_span: usize,
    pub rsi_period: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ema_fast_span: 10,
            ema_slow_span: 21,
            rsi_period: 14,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.ema_fast_span == 0 || self.ema_fast_span >= self.ema_slow_span {
            return Err(FeatureError::InvalidSpans {
                fast: self.ema_fast_span,
                slow: self.ema_slow_span,
            });
        }
        if self.rsi_period == 0 {
            return Err(FeatureError::InvalidRsiPeriod);
        }
        Ok(())
    }
}

/// Derived per-bar attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// In [0, 100].
    pub rsi: f64,
    pub macd: f64,
    pub price_diff: f64,
    pub volume_change: f64,
}

impl FeatureVector {
    /// Features in [`FEATURE_NAMES`] order.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ema_fast,
            self.ema_slow,
            self.rsi,
            self.macd,
            self.price_diff,
            self.volume_change,
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }
}

/// A retained bar and its features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub bar: Bar,
    pub features: FeatureVector,
}

/// Computes feature rows from a bar series.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    ema_fast: Ema,
    ema_slow: Ema,
    rsi: Rsi,
}

impl FeatureBuilder {
    pub fn new(config: &FeatureConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        Ok(Self {
            ema_fast: Ema::new(config.ema_fast_span),
            ema_slow: Ema::new(config.ema_slow_span),
            rsi: Rsi::new(config.rsi_period),
        })
    }

    /// Number of leading bars that can never produce a complete row.
    pub fn warmup_bars(&self) -> usize {
        self.rsi.lookback().max(PriceDiff.lookback())
    }

    /// Compute every feature for every bar, before the drop.
    pub fn compute_all(&self, bars: &[Bar]) -> Vec<FeatureVector> {
        let ema_fast = self.ema_fast.compute(bars);
        let ema_slow = self.ema_slow.compute(bars);
        let rsi = self.rsi.compute(bars);
        let macd = macd_line(&ema_fast, &ema_slow);
        let price_diff = PriceDiff.compute(bars);
        let volume_change = VolumeChange.compute(bars);

        (0..bars.len())
            .map(|i| FeatureVector {
                ema_fast: ema_fast[i],
                ema_slow: ema_slow[i],
                rsi: rsi[i],
                macd: macd[i],
                price_diff: price_diff[i],
                volume_change: volume_change[i],
            })
            .collect()
    }

    /// Compute features and keep only rows where every feature is defined.
    pub fn build(&self, bars: &[Bar]) -> Vec<FeatureRow> {
        let vectors = self.compute_all(bars);
        let rows: Vec<FeatureRow> = bars
            .iter()
            .zip(vectors)
            .filter(|(_, features)| features.is_complete())
            .map(|(bar, features)| FeatureRow {
                bar: bar.clone(),
                features,
            })
            .collect();

        tracing::debug!(
            bars = bars.len(),
            retained = rows.len(),
            dropped = bars.len() - rows.len(),
            "feature rows built"
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, Macd};

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 0.5 * i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(FeatureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_spans() {
        let config = FeatureConfig {
            ema_fast_span: 21,
            ema_slow_span: 10,
            ..Default::default()
        };
        assert_eq!(
            FeatureBuilder::new(&config).unwrap_err(),
            FeatureError::InvalidSpans { fast: 21, slow: 10 }
        );
    }

    #[test]
    fn rejects_zero_rsi_period() {
        let config = FeatureConfig {
            rsi_period: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(FeatureError::InvalidRsiPeriod));
    }

    #[test]
    fn warmup_rows_are_dropped() {
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        let bars = make_bars(&zigzag(30));
        let rows = builder.build(&bars);
        assert_eq!(builder.warmup_bars(), 14);
        assert_eq!(rows.len(), 16);
        assert_eq!(rows[0].bar.timestamp, bars[14].timestamp);
    }

    #[test]
    fn every_retained_row_is_complete() {
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        let mut bars = make_bars(&zigzag(40));
        bars[25].volume = 0.0;
        let rows = builder.build(&bars);
        assert!(rows.iter().all(|r| r.features.is_complete()));
        // The bar after the zero-volume bar has no volume change.
        assert!(rows.iter().all(|r| r.bar.timestamp != bars[26].timestamp));
    }

    #[test]
    fn macd_matches_ema_difference() {
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        for row in builder.build(&make_bars(&zigzag(30))) {
            let f = row.features;
            assert!((f.macd - (f.ema_fast - f.ema_slow)).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_matches_the_macd_indicator() {
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        let bars = make_bars(&zigzag(40));
        let macd = Macd::new(10, 21).compute(&bars);
        for (i, f) in builder.compute_all(&bars).iter().enumerate() {
            assert_eq!(f.macd, macd[i]);
        }
    }

    #[test]
    fn too_short_series_yields_nothing() {
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        assert!(builder.build(&make_bars(&zigzag(14))).is_empty());
        assert!(builder.build(&[]).is_empty());
    }

    #[test]
    fn as_array_follows_column_order() {
        let f = FeatureVector {
            ema_fast: 1.0,
            ema_slow: 2.0,
            rsi: 3.0,
            macd: 4.0,
            price_diff: 5.0,
            volume_change: 6.0,
        };
        assert_eq!(f.as_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(FEATURE_NAMES[2], "rsi");
    }
}
