//! BarSignal Core: bar domain types, indicators, features, labels, model, trade gate.
//!
//! Data flows strictly forward:
//! bars → feature rows → labels → boosted-tree classifier → signals → trade gate.
//! Nothing in this crate touches the filesystem.

pub mod domain;
pub mod features;
pub mod gate;
pub mod indicators;
pub mod labels;
pub mod model;
pub mod predict;

pub use domain::{Bar, Label, LogRow, Signal};
pub use features::{FeatureBuilder, FeatureConfig, FeatureError, FeatureRow, FeatureVector};
pub use gate::{GateStatus, TradeDecision, TradeGate};
pub use labels::{label_for, label_rows, LabelCounts, LabelThresholds};
pub use model::{
    Classifier, Evaluation, GbdtParams, GradientBoostedClassifier, ModelError, TimeSplit,
};
pub use predict::{feature_matrix, latest_log_rows, predict_signals};
