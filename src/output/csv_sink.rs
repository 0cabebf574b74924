//! CSV record sink
//!
//! One UTF-8, comma-delimited file per run. The header row holds the schema
//! field names in order and is written once, ahead of the first record.
//! Each row is flushed as soon as it is written, so an aborted run keeps
//! everything appended before the abort.

use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::record::{ListingRecord, Schema};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Appends listing records to a CSV file
pub struct CsvSink {
    path: PathBuf,
    schema: Arc<Schema>,
    writer: csv::Writer<File>,
    header_written: bool,
    records_written: u64,
}

impl CsvSink {
    /// Creates (or truncates) the destination
    pub fn create(path: &Path, schema: Arc<Schema>) -> OutputResult<Self> {
        let file = File::create(path)?;
        tracing::debug!("Opened {} (truncated)", path.display());

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        Ok(Self {
            path: path.to_path_buf(),
            schema,
            writer,
            header_written: false,
            records_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &ListingRecord) -> OutputResult<()> {
        if !record.schema().names().eq(self.schema.names()) {
            return Err(OutputError::SchemaMismatch);
        }

        if !self.header_written {
            self.writer.write_record(self.schema.names())?;
            self.header_written = true;
        }

        self.writer.write_record(record.to_row())?;
        self.writer.flush()?;
        self.records_written += 1;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.records_written
    }
}

/// Reads every record of a CSV file written with `schema`
pub fn read_records(path: &Path, schema: Arc<Schema>) -> OutputResult<Vec<ListingRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if found.is_empty() {
        // Nothing was ever appended
        return Ok(Vec::new());
    }
    check_header(&schema, found)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(ListingRecord::from_row(Arc::clone(&schema), row.iter())?);
    }
    Ok(records)
}

fn check_header(schema: &Schema, found: Vec<String>) -> OutputResult<()> {
    if schema.names().eq(found.iter().map(String::as_str)) {
        Ok(())
    } else {
        Err(OutputError::HeaderMismatch {
            expected: schema.names().map(str::to_string).collect(),
            found,
        })
    }
}
