//! Time-boxed memoization of the parsed signal log.
//!
//! An entry is keyed by the log file's (modified time, length). It is
//! served while it is younger than the TTL *and* the key still matches the
//! file on disk; otherwise the log is re-read. There is no eviction policy
//! beyond expiry.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use barsignal_core::LogRow;

use crate::error::PipelineError;
use crate::signal_log::read_log;

/// Identity of a log file version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogKey {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl LogKey {
    pub fn of(path: &Path) -> Result<Self, PipelineError> {
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::MissingFile(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug, Clone)]
struct CachedLog {
    path: PathBuf,
    key: LogKey,
    loaded_at: Instant,
    rows: Vec<LogRow>,
}

#[derive(Debug, Clone)]
pub struct LogCache {
    ttl: Duration,
    entry: Option<CachedLog>,
    hits: u64,
    misses: u64,
}

impl LogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Rows of the log at `path`, from cache when still fresh.
    pub fn get(&mut self, path: &Path) -> Result<&[LogRow], PipelineError> {
        self.get_at(path, Instant::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock reading.
    pub fn get_at(&mut self, path: &Path, now: Instant) -> Result<&[LogRow], PipelineError> {
        let key = LogKey::of(path)?;

        let fresh = self.entry.as_ref().is_some_and(|e| {
            e.path == path && e.key == key && now.saturating_duration_since(e.loaded_at) < self.ttl
        });

        if fresh {
            self.hits += 1;
        } else {
            self.misses += 1;
            let rows = read_log(path)?;
            tracing::debug!(path = %path.display(), rows = rows.len(), "signal log (re)loaded");
            self.entry = Some(CachedLog {
                path: path.to_path_buf(),
                key,
                loaded_at: now,
                rows,
            });
        }

        Ok(self
            .entry
            .as_ref()
            .map(|e| e.rows.as_slice())
            .unwrap_or_default())
    }

    /// Drop the cached entry so the next read goes to disk.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
