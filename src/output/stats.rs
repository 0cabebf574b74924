//! Statistics over a scraped CSV file
//!
//! This module reads an output file back against the schema and reports
//! how often each field was populated.

use crate::output::csv_sink::read_records;
use crate::output::traits::OutputResult;
use crate::record::{ListingRecord, Schema};
use std::path::Path;
use std::sync::Arc;

/// Population statistics for one output file
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStatistics {
    /// Total number of records in the file
    pub total_records: u64,

    /// Populated count per field, in schema order
    pub populated_by_field: Vec<(String, u64)>,

    /// Records with nothing but the identity URL
    pub empty_records: u64,

    /// Distinct listing URLs
    pub unique_urls: u64,
}

impl RecordStatistics {
    /// Computes statistics over already-loaded records
    pub fn from_records(schema: &Schema, records: &[ListingRecord]) -> Self {
        let mut populated_by_field: Vec<(String, u64)> =
            schema.names().map(|name| (name.to_string(), 0)).collect();
        let mut empty_records = 0;
        let mut urls = std::collections::HashSet::new();

        for record in records {
            for (slot, (_, value)) in populated_by_field.iter_mut().zip(record.iter()) {
                if value.is_some() {
                    slot.1 += 1;
                }
            }
            if record.populated_count() == 0 {
                empty_records += 1;
            }
            urls.insert(record.url());
        }

        Self {
            total_records: records.len() as u64,
            populated_by_field,
            empty_records,
            unique_urls: urls.len() as u64,
        }
    }

    /// Populated count for one field
    pub fn populated(&self, field: &str) -> Option<u64> {
        self.populated_by_field
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, count)| *count)
    }
}

/// Loads statistics from a CSV output file
///
/// # Arguments
///
/// * `path` - The CSV file to read
/// * `schema` - The schema the file was written with
///
/// # Returns
///
/// * `Ok(RecordStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - The file could not be read or has another header
pub fn load_statistics(path: &Path, schema: Arc<Schema>) -> OutputResult<RecordStatistics> {
    let records = read_records(path, Arc::clone(&schema))?;
    Ok(RecordStatistics::from_records(&schema, &records))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RecordStatistics) {
    println!("=== Listing Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    println!("  Unique listings: {}", stats.unique_urls);
    println!("  Records with no fields: {}", stats.empty_records);
    println!();

    println!("Fields Populated:");
    for (field, count) in &stats.populated_by_field {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", field, count, percentage);
    }
}
