//! Signal log store: a small CSV rewritten on every run.
//!
//! Layout: `timestamp,signal,confidence,price`, one row per recent bar.
//! Confidence and price are written with two decimals, so a write/read
//! round trip returns them rounded to 0.01. Rounding works on the exact
//! binary value and exact ties go to even, so `4500.125` is written as
//! `4500.12`. Writes are atomic: the log is written to `{path}.tmp` and
//! renamed into place, so an interrupted run leaves the previous log intact.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use barsignal_core::{Label, LogRow};

use crate::error::PipelineError;
use crate::ingest::parse_timestamp;

pub const LOG_HEADER: [&str; 4] = ["timestamp", "signal", "confidence", "price"];

/// Timestamp layout used in the log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct LogRecord {
    timestamp: String,
    signal: String,
    confidence: f64,
    price: f64,
}

/// Serialize rows to CSV text.
pub fn export_log_csv(rows: &[LogRow]) -> Result<String, PipelineError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(LOG_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            row.signal.to_string(),
            format!("{:.2}", row.confidence),
            format!("{:.2}", row.price),
        ])?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| PipelineError::unexpected(format!("failed to flush CSV writer: {e}")))?;
    String::from_utf8(data)
        .map_err(|e| PipelineError::unexpected(format!("CSV output is not UTF-8: {e}")))
}

/// Replace the log at `path` with `rows`.
pub fn write_log(path: &Path, rows: &[LogRow]) -> Result<(), PipelineError> {
    let csv = export_log_csv(rows)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path(path);
    fs::write(&tmp_path, csv)?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        PipelineError::unexpected(format!("atomic rename failed: {e}"))
    })?;

    tracing::info!(path = %path.display(), rows = rows.len(), "signal log written");
    Ok(())
}

/// Read every row of the log at `path`.
pub fn read_log(path: &Path) -> Result<Vec<LogRow>, PipelineError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::MissingFile(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    parse_log(&bytes)
}

/// Parse log CSV bytes.
pub fn parse_log(bytes: &[u8]) -> Result<Vec<LogRow>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    for col in LOG_HEADER {
        if !headers.iter().any(|h| h == col) {
            return Err(PipelineError::MissingColumn(col.to_string()));
        }
    }

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<LogRecord>().enumerate() {
        let record = record?;
        let line = i + 2;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
            PipelineError::unexpected(format!(
                "log line {line}: unparseable timestamp '{}'",
                record.timestamp
            ))
        })?;
        let signal: Label = record
            .signal
            .parse()
            .map_err(|e| PipelineError::unexpected(format!("log line {line}: {e}")))?;
        rows.push(LogRow {
            timestamp,
            signal,
            confidence: record.confidence,
            price: record.price,
        });
    }
    Ok(rows)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
