//! Output module for persisting records and reporting on runs
//!
//! This module handles:
//! - Appending extracted records to a CSV file
//! - Reading an output file back against the schema
//! - Run summaries and per-field statistics

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::{read_records, CsvSink};
pub use stats::{load_statistics, print_statistics, RecordStatistics};
pub use traits::{OutputError, OutputResult, RecordSink, RunStatus, RunSummary};
