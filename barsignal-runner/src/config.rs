//! Serializable pipeline configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! input_path = "data/bars.csv"
//! log_path = "signals_log.csv"
//! trading_end_hour = 20
//! min_confidence = 60.0
//!
//! [model]
//! n_estimators = 100
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use barsignal_core::{FeatureConfig, GbdtParams, LabelThresholds, TradeGate};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bar CSV with `Time, Last, Volume` columns.
    pub input_path: PathBuf,
    /// Signal log, rewritten on every run.
    pub log_path: PathBuf,
    /// Declared for position sizing; not read by any pipeline stage.
    pub max_contracts: u32,
    /// Signals are actionable only while the UTC hour is below this.
    pub trading_end_hour: u32,
    /// Minimum confidence (percent) for an actionable signal.
    pub min_confidence: f64,
    /// Number of most recent rows written to the log.
    pub log_window: usize,
    /// Trailing fraction of rows held out for scoring.
    pub test_fraction: f64,
    /// How long a parsed log stays cached.
    pub cache_ttl_secs: u64,
    pub features: FeatureConfig,
    pub labels: LabelThresholds,
    pub model: GbdtParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/bars.csv"),
            log_path: PathBuf::from("signals_log.csv"),
            max_contracts: 1,
            trading_end_hour: 20,
            min_confidence: 60.0,
            log_window: 10,
            test_fraction: 0.2,
            cache_ttl_secs: 60,
            features: FeatureConfig::default(),
            labels: LabelThresholds::default(),
            model: GbdtParams::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trading_end_hour > 24 {
            return Err(ConfigError::Invalid(format!(
                "trading_end_hour must be in 0..=24 (got {})",
                self.trading_end_hour
            )));
        }
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must be in [0, 100] (got {})",
                self.min_confidence
            )));
        }
        if self.log_window == 0 {
            return Err(ConfigError::Invalid("log_window must be >= 1".into()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "test_fraction must be in (0, 1) (got {})",
                self.test_fraction
            )));
        }
        if self.labels.oversold >= self.labels.overbought {
            return Err(ConfigError::Invalid(format!(
                "labels.oversold ({}) must be below labels.overbought ({})",
                self.labels.oversold, self.labels.overbought
            )));
        }
        self.features
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.model
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn gate(&self) -> TradeGate {
        TradeGate::new(self.trading_end_hour, self.min_confidence)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
