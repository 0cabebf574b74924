//! Record sink trait and run summary types
//!
//! This module defines the interface the paginator writes through and the
//! summary it produces when a run ends.

use crate::record::{ListingRecord, SchemaError};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Existing header does not match the schema: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Record schema differs from the sink schema")]
    SchemaMismatch,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for extracted records
///
/// Records are appended in the order they are handed over. The header is
/// the sink's concern: it is written exactly once, before the first row.
pub trait RecordSink: Send {
    /// Appends one record and makes it durable before returning
    fn append(&mut self, record: &ListingRecord) -> OutputResult<()>;

    /// Number of records appended through this sink
    fn records_written(&self) -> u64;
}

/// Terminal state of a scrape run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Aborted { page: u32, reason: String },
}

impl RunStatus {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Completed => f.write_str("completed"),
            Self::Aborted { page, reason } => {
                write!(f, "aborted on page {}: {}", page, reason)
            }
        }
    }
}

/// Counters and timing for one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u64>,
    pub status: RunStatus,

    /// Result pages whose links were collected
    pub pages_visited: u32,

    /// Unique detail links handed to the extractor
    pub links_collected: u64,

    /// Links already seen on an earlier page
    pub duplicates_skipped: u64,

    pub records_written: u64,

    /// Records below the populated-field threshold
    pub records_discarded: u64,

    /// Detail pages that could not be loaded
    pub details_failed: u64,
}

impl RunSummary {
    /// Starts a summary clock at the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            duration_seconds: None,
            status: RunStatus::Running,
            pages_visited: 0,
            links_collected: 0,
            duplicates_skipped: 0,
            records_written: 0,
            records_discarded: 0,
            details_failed: 0,
        }
    }

    /// Stamps the finish time and terminal status
    pub fn finish(&mut self, status: RunStatus) {
        let finished = Utc::now();
        self.duration_seconds = Some((finished - self.started_at).num_seconds().max(0) as u64);
        self.finished_at = Some(finished);
        self.status = status;
    }

    /// Writes the summary to the log
    pub fn log(&self) {
        tracing::info!(
            "Run {} in {}s: {} pages, {} links ({} duplicates), {} records written, {} discarded, {} detail failures",
            self.status,
            self.duration_seconds.unwrap_or(0),
            self.pages_visited,
            self.links_collected,
            self.duplicates_skipped,
            self.records_written,
            self.records_discarded,
            self.details_failed
        );
    }
}
