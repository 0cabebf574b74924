//! Listing link collection
//!
//! Pulls detail-page links out of a rendered result page:
//! - anchors are taken in document order
//! - an anchor only counts when it wraps a listing card
//! - targets are resolved to absolute http(s) URLs
//! - the first occurrence of a URL wins and the list is capped

use crate::config::SelectorConfig;
use crate::render::RenderSession;
use crate::{RenderError, RenderResult};
use std::collections::HashSet;
use url::Url;

/// Extracts listing-card links from result pages
#[derive(Debug, Clone)]
pub struct LinkCollector {
    anchor_selector: String,
    card_selector: String,
}

impl LinkCollector {
    pub fn new(anchor_selector: &str, card_selector: &str) -> Self {
        Self {
            anchor_selector: anchor_selector.to_string(),
            card_selector: card_selector.to_string(),
        }
    }

    pub fn from_selectors(selectors: &SelectorConfig) -> Self {
        Self::new(&selectors.listing_anchor, &selectors.listing_card)
    }

    /// Collects at most `cap` unique listing URLs from the loaded page
    ///
    /// An empty result is not an error: it is what the last result page
    /// past the end of the catalog looks like.
    ///
    /// # Errors
    ///
    /// Fails when the session has no document loaded or a selector query
    /// fails. Missing or unusable `href` values are skipped silently.
    pub fn collect<S>(&self, session: &S, cap: usize) -> RenderResult<Vec<String>>
    where
        S: RenderSession + ?Sized,
    {
        let base_url = session.current_url().ok_or(RenderError::NotNavigated)?;
        let anchors = session.query(&self.anchor_selector)?;

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in anchors {
            if links.len() >= cap {
                break;
            }

            if anchor.query_one(&self.card_selector)?.is_none() {
                continue;
            }

            let Some(link) = anchor
                .attribute("href")
                .and_then(|href| resolve_link(href, base_url))
            else {
                continue;
            };

            if seen.insert(link.clone()) {
                links.push(link);
            }
        }

        Ok(links)
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only targets
/// - javascript:, mailto:, tel: and data: schemes
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
