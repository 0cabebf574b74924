//! Detail page extraction
//!
//! A detail page is read in four independent passes:
//!
//! | Pass | Source | Sets |
//! |------|--------|------|
//! | price | one fixed element | the price field (text) |
//! | attributes | label/value pairs | any field whose name equals a label (text) |
//! | features | labels inside the boolean card | any flag field whose name equals a label (`true`) |
//! | published | label/value pairs behind the listing-info control | the publish date field (text) |
//!
//! Each pass reports a [`PassOutcome`]. A failing pass leaves its fields
//! absent and never stops the other passes, so extraction always yields a
//! record.

use crate::config::{CrawlerConfig, SelectorConfig};
use crate::record::{FieldKind, FieldValue, ListingRecord, Schema};
use crate::render::{Element, Locator, RenderSession};
use crate::{ExtractionError, RenderError};
use std::sync::Arc;
use std::time::Duration;

/// Result of one extraction pass
#[derive(Debug)]
pub enum PassOutcome {
    /// The pass set this many fields
    Populated(usize),
    /// The source was missing or matched nothing
    Absent,
    /// The pass failed; its fields stay absent
    Failed(ExtractionError),
}

impl PassOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn populated(&self) -> usize {
        match self {
            Self::Populated(count) => *count,
            _ => 0,
        }
    }

    fn from_count(count: usize) -> Self {
        if count == 0 {
            Self::Absent
        } else {
            Self::Populated(count)
        }
    }
}

/// Per-pass outcomes for one detail page
#[derive(Debug)]
pub struct ExtractionReport {
    pub price: PassOutcome,
    pub attributes: PassOutcome,
    pub features: PassOutcome,
    pub published: PassOutcome,
}

impl ExtractionReport {
    pub fn failed_passes(&self) -> usize {
        [&self.price, &self.attributes, &self.features, &self.published]
            .iter()
            .filter(|outcome| outcome.is_failed())
            .count()
    }
}

/// Builds [`ListingRecord`]s from rendered detail pages
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    schema: Arc<Schema>,
    selectors: SelectorConfig,
    info_panel_timeout: Duration,
    panel_settle: Duration,
}

impl DetailExtractor {
    pub fn new(
        schema: Arc<Schema>,
        selectors: SelectorConfig,
        info_panel_timeout: Duration,
        panel_settle: Duration,
    ) -> Self {
        Self {
            schema,
            selectors,
            info_panel_timeout,
            panel_settle,
        }
    }

    pub fn from_config(
        schema: Arc<Schema>,
        crawler: &CrawlerConfig,
        selectors: &SelectorConfig,
    ) -> Self {
        Self::new(
            schema,
            selectors.clone(),
            crawler.info_panel_timeout(),
            crawler.panel_settle(),
        )
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Extracts one record from the page loaded in `session`
    pub async fn extract<S>(&self, session: &mut S, url: &str) -> ListingRecord
    where
        S: RenderSession + ?Sized,
    {
        self.extract_with_report(session, url).await.0
    }

    /// Extracts one record and reports what each pass did
    pub async fn extract_with_report<S>(
        &self,
        session: &mut S,
        url: &str,
    ) -> (ListingRecord, ExtractionReport)
    where
        S: RenderSession + ?Sized,
    {
        let mut record = ListingRecord::new(Arc::clone(&self.schema), url);

        let price = self.extract_price(&*session, &mut record);
        let attributes = self.extract_attributes(&*session, &mut record);
        let features = self.extract_features(&*session, &mut record);
        let published = self.extract_published(session, &mut record).await;

        let report = ExtractionReport {
            price,
            attributes,
            features,
            published,
        };

        for (pass, outcome) in [
            ("price", &report.price),
            ("attributes", &report.attributes),
            ("features", &report.features),
            ("published", &report.published),
        ] {
            match outcome {
                PassOutcome::Failed(e) => tracing::warn!("{}: {} pass failed: {}", url, pass, e),
                other => tracing::debug!("{}: {} pass {:?}", url, pass, other),
            }
        }

        (record, report)
    }

    fn extract_price<S>(&self, session: &S, record: &mut ListingRecord) -> PassOutcome
    where
        S: RenderSession + ?Sized,
    {
        let selector = &self.selectors.price;
        let found = match session.query(selector) {
            Ok(found) => found,
            Err(source) => return failed_query(selector, source),
        };

        match found.first().map(Element::text) {
            Some(text) if !text.is_empty() => {
                record.set(self.schema.price_field(), FieldValue::Text(text.to_string()));
                PassOutcome::Populated(1)
            }
            _ => PassOutcome::Absent,
        }
    }

    fn extract_attributes<S>(&self, session: &S, record: &mut ListingRecord) -> PassOutcome
    where
        S: RenderSession + ?Sized,
    {
        let pairs = match self.labeled_pairs(session) {
            Ok(pairs) => pairs,
            Err(e) => return PassOutcome::Failed(e),
        };

        let mut populated = 0;
        for (label, item) in pairs {
            let value = match item.query_one(&self.selectors.detail_value) {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(source) => return failed_query(&self.selectors.detail_value, source),
            };

            if value.text().is_empty() {
                tracing::trace!("Ignoring empty value for {}", label);
                continue;
            }

            if record.set(&label, FieldValue::Text(value.text().to_string())) {
                populated += 1;
            } else {
                tracing::trace!("Ignoring label not in schema: {}", label);
            }
        }

        PassOutcome::from_count(populated)
    }

    fn extract_features<S>(&self, session: &S, record: &mut ListingRecord) -> PassOutcome
    where
        S: RenderSession + ?Sized,
    {
        let container_selector = &self.selectors.boolean_container;
        let container = match session.query(container_selector) {
            Ok(found) => match found.into_iter().next() {
                Some(container) => container,
                None => return PassOutcome::Absent,
            },
            Err(source) => return failed_query(container_selector, source),
        };

        let labels = match container.query(&self.selectors.detail_label) {
            Ok(labels) => labels,
            Err(source) => return failed_query(&self.selectors.detail_label, source),
        };

        let populated = labels
            .iter()
            .map(|label| label.text().trim())
            .filter(|name| self.schema.kind(name) == Some(FieldKind::Flag))
            .filter(|name| record.set(name, FieldValue::Flag(true)))
            .count();

        PassOutcome::from_count(populated)
    }

    async fn extract_published<S>(&self, session: &mut S, record: &mut ListingRecord) -> PassOutcome
    where
        S: RenderSession + ?Sized,
    {
        let locator = Locator::Text {
            selector: self.selectors.info_tab.clone(),
            text: self.selectors.info_tab_text.clone(),
        };

        let control = match session
            .wait_for_clickable(&locator, self.info_panel_timeout)
            .await
        {
            Ok(control) => control,
            Err(e @ RenderError::Timeout { .. }) => {
                return PassOutcome::Failed(ExtractionError::InteractionTimeout(e))
            }
            Err(e) => return PassOutcome::Failed(ExtractionError::Interaction(e)),
        };

        if let Err(e) = session.click(&control).await {
            return PassOutcome::Failed(ExtractionError::Interaction(e));
        }

        if !self.panel_settle.is_zero() {
            tokio::time::sleep(self.panel_settle).await;
        }

        let pairs = match self.labeled_pairs(&*session) {
            Ok(pairs) => pairs,
            Err(e) => return PassOutcome::Failed(e),
        };

        let published_field = self.schema.published_field();
        let mut published = None;
        for (label, item) in pairs {
            if label != published_field {
                continue;
            }
            match item.query(&self.selectors.date_value) {
                Ok(parts) => {
                    if let Some(last) = parts.last().filter(|part| !part.text().is_empty()) {
                        published = Some(last.text().to_string());
                    }
                }
                Err(source) => return failed_query(&self.selectors.date_value, source),
            }
        }

        match published {
            Some(date) => {
                record.set(published_field, FieldValue::Text(date));
                PassOutcome::Populated(1)
            }
            None => PassOutcome::Absent,
        }
    }

    /// Label text and owning item for every label/value item on the page
    fn labeled_pairs<S>(&self, session: &S) -> Result<Vec<(String, Element)>, ExtractionError>
    where
        S: RenderSession + ?Sized,
    {
        let items = session
            .query(&self.selectors.detail_item)
            .map_err(|source| ExtractionError::Query {
                selector: self.selectors.detail_item.clone(),
                source,
            })?;

        let mut pairs = Vec::with_capacity(items.len());
        for item in items {
            let label = item
                .query_one(&self.selectors.detail_label)
                .map_err(|source| ExtractionError::Query {
                    selector: self.selectors.detail_label.clone(),
                    source,
                })?;
            if let Some(label) = label {
                pairs.push((label.text().to_string(), item));
            }
        }

        Ok(pairs)
    }
}

fn failed_query(selector: &str, source: RenderError) -> PassOutcome {
    PassOutcome::Failed(ExtractionError::Query {
        selector: selector.to_string(),
        source,
    })
}
