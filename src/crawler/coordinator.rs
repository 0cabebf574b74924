//! Scrape coordinator - the pagination loop
//!
//! This module walks the result pages in order and, for each one:
//! - Opens a renderer session, loads the page and collects listing links
//! - Closes that session before any detail page is opened
//! - Renders each new link in its own session and extracts a record
//! - Appends the record to the sink
//!
//! A listing page that cannot be loaded ends the run once its retry budget
//! is spent; everything appended before that point stays in the sink.

use crate::config::{revalidate, Config};
use crate::crawler::collector::LinkCollector;
use crate::crawler::extractor::DetailExtractor;
use crate::crawler::pacing::DelayPolicy;
use crate::output::{CsvSink, OutputError, RecordSink, RunStatus, RunSummary};
use crate::record::{ListingRecord, Schema};
use crate::render::{HttpRenderer, PageRenderer, RenderSession};
use crate::{RenderResult, ScrapeError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Run parameters for the pagination loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSettings {
    pub base_url: String,
    pub max_pages: u32,
    pub cap_per_page: usize,
    pub page_retries: u32,
    pub min_populated_fields: usize,
}

impl PaginationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.crawler.base_url.clone(),
            max_pages: config.crawler.max_pages,
            cap_per_page: config.crawler.cap_per_page,
            page_retries: config.crawler.page_retries,
            min_populated_fields: config.crawler.min_populated_fields,
        }
    }

    /// URL of result page `page` (1-based): `{base}/{page}`
    pub fn page_url(&self, page: u32) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), page)
    }
}

/// Outcome of handing one detail URL through render, extract and persist
enum Dispatch {
    Written,
    Discarded,
    RenderFailed,
}

/// Drives a scrape from page 1 to `max_pages`
pub struct Paginator<R: PageRenderer, S: RecordSink> {
    renderer: R,
    sink: S,
    collector: LinkCollector,
    extractor: DetailExtractor,
    pacing: DelayPolicy,
    settings: PaginationSettings,
    seen: HashSet<String>,
}

impl<R: PageRenderer, S: RecordSink> Paginator<R, S> {
    pub fn new(
        renderer: R,
        sink: S,
        collector: LinkCollector,
        extractor: DetailExtractor,
        pacing: DelayPolicy,
        settings: PaginationSettings,
    ) -> Self {
        Self {
            renderer,
            sink,
            collector,
            extractor,
            pacing,
            settings,
            seen: HashSet::new(),
        }
    }

    /// Wires a paginator from the configuration
    pub fn from_config(config: &Config, renderer: R, sink: S, schema: Arc<Schema>) -> Self {
        Self::new(
            renderer,
            sink,
            LinkCollector::from_selectors(&config.selectors),
            DetailExtractor::from_config(schema, &config.crawler, &config.selectors),
            DelayPolicy::from_config(&config.crawler),
            PaginationSettings::from_config(config),
        )
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs the whole scrape
    ///
    /// Never fails as such: a fatal error ends the loop and is reported in
    /// the returned summary's status.
    pub async fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::start();
        tracing::info!(
            "Starting scrape of {} ({} pages, up to {} listings each)",
            self.settings.base_url,
            self.settings.max_pages,
            self.settings.cap_per_page
        );

        let status = self.run_pages(&mut summary).await;
        if let RunStatus::Aborted { page, reason } = &status {
            tracing::error!("Scrape aborted on page {}: {}", page, reason);
        }

        summary.finish(status);
        summary.log();
        summary
    }

    async fn run_pages(&mut self, summary: &mut RunSummary) -> RunStatus {
        for page in 1..=self.settings.max_pages {
            let links = match self.collect_with_retries(page).await {
                Ok(links) => links,
                Err(e) => {
                    return RunStatus::Aborted {
                        page,
                        reason: e.to_string(),
                    }
                }
            };
            summary.pages_visited += 1;

            if links.is_empty() {
                tracing::info!("Page {}: no listings", page);
                continue;
            }

            let found = links.len();
            let fresh: Vec<String> = links
                .into_iter()
                .filter(|link| self.seen.insert(link.clone()))
                .collect();
            let total = fresh.len();
            summary.links_collected += total as u64;
            summary.duplicates_skipped += (found - total) as u64;
            if found > total {
                tracing::debug!("Page {}: {} links already seen", page, found - total);
            }
            tracing::info!("Page {}: {} listings", page, total);

            for (index, url) in fresh.iter().enumerate() {
                tracing::info!("[page {} | {}/{}] {}", page, index + 1, total, url);
                match self.dispatch(url).await {
                    Ok(Dispatch::Written) => summary.records_written += 1,
                    Ok(Dispatch::Discarded) => summary.records_discarded += 1,
                    Ok(Dispatch::RenderFailed) => summary.details_failed += 1,
                    Err(e) => {
                        return RunStatus::Aborted {
                            page,
                            reason: e.to_string(),
                        }
                    }
                }
            }
        }

        RunStatus::Completed
    }

    /// Collects the links of one page, retrying within the page budget
    pub async fn collect_with_retries(&self, page: u32) -> RenderResult<Vec<String>> {
        let mut attempt = 0;
        loop {
            match self.collect_page(page).await {
                Ok(links) => return Ok(links),
                Err(e) if attempt < self.settings.page_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Page {} failed ({}), retry {}/{}",
                        page,
                        e,
                        attempt,
                        self.settings.page_retries
                    );
                    self.pacing.pause().await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Loads result page `page` in a fresh session and collects its links
    ///
    /// The session is closed before returning, whatever the outcome.
    pub async fn collect_page(&self, page: u32) -> RenderResult<Vec<String>> {
        let url = self.settings.page_url(page);
        tracing::debug!("Loading result page {}", url);

        let mut session = self.renderer.new_session().await?;
        let result = self.load_and_collect(&mut session, &url).await;
        release(&mut session, &url).await;
        result
    }

    async fn load_and_collect(
        &self,
        session: &mut R::Session,
        url: &str,
    ) -> RenderResult<Vec<String>> {
        session.navigate(url).await?;
        self.pacing.pause().await;
        self.collector.collect(&*session, self.settings.cap_per_page)
    }

    /// Renders, extracts and persists one detail URL
    ///
    /// Render failures are contained; only sink errors propagate.
    async fn dispatch(&mut self, url: &str) -> Result<Dispatch, OutputError> {
        let record = match self.render_detail(url).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                return Ok(Dispatch::RenderFailed);
            }
        };

        let populated = record.populated_count();
        if populated < self.settings.min_populated_fields {
            tracing::info!(
                "Discarding {}: {} fields populated, {} required",
                url,
                populated,
                self.settings.min_populated_fields
            );
            return Ok(Dispatch::Discarded);
        }

        self.sink.append(&record)?;
        tracing::debug!("Saved {} ({} fields)", url, populated);
        Ok(Dispatch::Written)
    }

    /// Extracts one record from `url` in its own session
    pub async fn render_detail(&self, url: &str) -> RenderResult<ListingRecord> {
        let mut session = self.renderer.new_session().await?;
        let result = self.load_and_extract(&mut session, url).await;
        release(&mut session, url).await;
        result
    }

    async fn load_and_extract(
        &self,
        session: &mut R::Session,
        url: &str,
    ) -> RenderResult<ListingRecord> {
        session.navigate(url).await?;
        self.pacing.pause().await;
        Ok(self.extractor.extract(session, url).await)
    }
}

async fn release<T: RenderSession + ?Sized>(session: &mut T, url: &str) {
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close session for {}: {}", url, e);
    }
}

/// Runs a complete scrape against the live site
///
/// Validates the configuration and opens one throwaway session, so a bad
/// setup fails before the configured CSV file is truncated. Then walks
/// every result page with the HTTP renderer.
///
/// # Example
///
/// ```no_run
/// use listing_scraper::config::load_config;
/// use listing_scraper::crawler::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_scrape(config).await?;
/// println!("{} records", summary.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config) -> Result<RunSummary, ScrapeError> {
    revalidate(&config)?;

    let renderer = HttpRenderer::new(config.renderer.clone());
    let mut check = renderer.new_session().await?;
    check.close().await?;

    let schema = Arc::new(Schema::listing());
    let sink = CsvSink::create(Path::new(&config.output.csv_path), Arc::clone(&schema))?;

    let mut paginator = Paginator::from_config(&config, renderer, sink, schema);
    Ok(paginator.run().await)
}
