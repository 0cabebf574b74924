//! Listing-Scraper: a paginated real-estate catalog harvester
//!
//! This crate walks the result pages of a listing catalog, collects the
//! detail-page links on each one, extracts a fixed schema of attributes
//! from every detail page and appends the records to a CSV file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod render;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Listing-Scraper operations
///
/// Every variant here is fatal to the run. Field-level problems are
/// carried by [`ExtractionError`] inside a pass outcome and never reach
/// this type.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer session error: {0}")]
    Render(#[from] RenderError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Errors raised by a page renderer session
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to open renderer session: {0}")]
    Session(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("No document loaded in session")]
    NotNavigated,

    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },
}

/// A failed extraction pass. Recorded, logged, never propagated.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("query `{selector}` failed: {source}")]
    Query {
        selector: String,
        source: RenderError,
    },

    #[error("info panel control unavailable: {0}")]
    InteractionTimeout(RenderError),

    #[error("info panel interaction failed: {0}")]
    Interaction(RenderError),
}

/// Result type alias for Listing-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for renderer operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_scrape, Paginator};
pub use output::{CsvSink, RecordSink, RunStatus, RunSummary};
pub use record::{FieldValue, ListingRecord, Schema};
pub use render::{HttpRenderer, PageRenderer, RenderSession};
