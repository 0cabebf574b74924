//! Crawler module for walking the catalog and extracting listings
//!
//! This module contains the core scraping logic, including:
//! - Listing link collection from result pages
//! - Detail page extraction in independent passes
//! - Settle delays between navigations
//! - The pagination loop that ties them to a record sink

mod collector;
mod coordinator;
mod extractor;
mod pacing;

pub use collector::{resolve_link, LinkCollector};
pub use coordinator::{run_scrape, PaginationSettings, Paginator};
pub use extractor::{DetailExtractor, ExtractionReport, PassOutcome};
pub use pacing::DelayPolicy;
