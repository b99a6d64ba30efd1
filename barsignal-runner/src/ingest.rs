//! Bar ingestion from the source CSV.
//!
//! The source exports `Time, Last, Volume`. Columns are renamed to the
//! internal `datetime, close, volume` before validation, so an error names
//! the internal column. Files that already use internal names are accepted
//! as-is.

use chrono::{DateTime, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::Path;

use barsignal_core::Bar;

use crate::error::PipelineError;

/// Source header → internal column name.
const RENAMES: [(&str, &str); 3] = [("Time", "datetime"), ("Last", "close"), ("Volume", "volume")];

const REQUIRED: [&str; 3] = ["datetime", "close", "volume"];

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M",
];

/// Bars read from a file, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub bars: Vec<Bar>,
    /// BLAKE3 of the raw file bytes.
    pub dataset_hash: String,
    /// Rows skipped because close/volume were out of range.
    pub skipped: usize,
}

/// Read and parse the bar CSV at `path`.
pub fn load_bars(path: &Path) -> Result<LoadedBars, PipelineError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::MissingFile(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let dataset_hash = blake3::hash(&bytes).to_hex().to_string();
    let (bars, skipped) = parse_bars(&bytes)?;

    tracing::info!(
        path = %path.display(),
        bars = bars.len(),
        skipped,
        "bars loaded"
    );
    Ok(LoadedBars {
        bars,
        dataset_hash,
        skipped,
    })
}

/// Parse CSV bytes into bars sorted by timestamp.
///
/// Returns the bars and the number of rows skipped for failing
/// [`Bar::is_sane`]. Duplicate timestamps keep the last row.
pub fn parse_bars(bytes: &[u8]) -> Result<(Vec<Bar>, usize), PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| internal_name(h).to_string())
        .collect();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    };
    let [time_idx, close_idx, volume_idx] = [
        column(REQUIRED[0])?,
        column(REQUIRED[1])?,
        column(REQUIRED[2])?,
    ];

    let mut by_time: BTreeMap<NaiveDateTime, Bar> = BTreeMap::new();
    let mut skipped = 0;
    let mut duplicates = 0;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = row + 2;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let timestamp = parse_timestamp(field(time_idx)).ok_or_else(|| {
            PipelineError::unexpected(format!(
                "line {line}: unparseable timestamp '{}'",
                field(time_idx)
            ))
        })?;
        let close = parse_number(field(close_idx), "close", line)?;
        let volume = parse_number(field(volume_idx), "volume", line)?;

        let bar = Bar::new(timestamp, close, volume);
        if !bar.is_sane() {
            tracing::warn!(line, close, volume, "skipping out-of-range bar");
            skipped += 1;
            continue;
        }
        if by_time.insert(timestamp, bar).is_some() {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        tracing::warn!(duplicates, "duplicate timestamps, kept the last row of each");
    }
    Ok((by_time.into_values().collect(), skipped))
}

fn internal_name(header: &str) -> &str {
    RENAMES
        .iter()
        .find(|(source, _)| *source == header)
        .map(|(_, internal)| *internal)
        .unwrap_or(header)
}

fn parse_number(raw: &str, column: &str, line: usize) -> Result<f64, PipelineError> {
    raw.parse::<f64>().map_err(|_| {
        PipelineError::unexpected(format!("line {line}: invalid {column} value '{raw}'"))
    })
}

/// Accepts RFC 3339 (converted to UTC) and common naive layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
