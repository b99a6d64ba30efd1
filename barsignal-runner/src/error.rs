//! Pipeline failure taxonomy.
//!
//! Every failure in a run maps to one of three kinds. The caller reports it
//! and carries on; nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

use barsignal_core::{FeatureError, ModelError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("missing column '{0}' in input data")]
    MissingColumn(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PipelineError {
    pub fn unexpected(msg: impl Into<String>) -> Self {
        PipelineError::Unexpected(msg.into())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Unexpected(format!("csv: {e}"))
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Unexpected(format!("io: {e}"))
    }
}

impl From<ModelError> for PipelineError {
    fn from(e: ModelError) -> Self {
        PipelineError::Unexpected(format!("model: {e}"))
    }
}

impl From<FeatureError> for PipelineError {
    fn from(e: FeatureError) -> Self {
        PipelineError::Unexpected(format!("features: {e}"))
    }
}
