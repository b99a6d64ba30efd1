//! BarSignal Runner: pipeline orchestration on top of `barsignal-core`.
//!
//! This crate provides:
//! - TOML pipeline configuration
//! - CSV bar ingestion with column renaming and validation
//! - The signal log store (atomic rewrite, read back)
//! - A TTL cache over the parsed log
//! - The pipeline run itself and its report
//! - A read-only log summary for display surfaces

pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod signal_log;
pub mod summary;

pub use cache::{LogCache, LogKey};
pub use config::{ConfigError, PipelineConfig};
pub use error::PipelineError;
pub use ingest::{load_bars, parse_bars, LoadedBars};
pub use pipeline::{Pipeline, PipelineOutput, RunReport};
pub use signal_log::{export_log_csv, read_log, write_log};
pub use summary::LogSummary;
