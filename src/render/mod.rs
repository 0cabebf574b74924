//! Page renderer capability
//!
//! The scraper only needs a handful of operations from whatever loads and
//! renders pages:
//! - open a fresh session
//! - navigate to a URL
//! - query the loaded document with CSS selectors
//! - wait (bounded) for an interactive control and click it
//! - close the session
//!
//! `HttpRenderer` implements the capability over `reqwest` and `scraper`.
//! A browser automation backend plugs in behind the same traits.

mod document;
mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use document::{parse_selector, Element, HtmlDocument, Locator};
pub use http::{build_http_client, HttpRenderer, HttpSession};

use crate::RenderResult;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Factory for renderer sessions
///
/// One session is opened per listing page and per detail page; sessions
/// are never shared between pages.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    type Session: RenderSession;

    /// Opens a fresh session with the renderer's fixed capability profile
    async fn new_session(&self) -> RenderResult<Self::Session>;
}

/// A single renderer session
#[async_trait]
pub trait RenderSession: Send {
    /// Loads `url`, replacing any previously loaded document
    async fn navigate(&mut self, url: &str) -> RenderResult<()>;

    /// URL of the loaded document, after redirects
    fn current_url(&self) -> Option<&Url>;

    /// All elements matching `selector` in the loaded document
    fn query(&self, selector: &str) -> RenderResult<Vec<Element>>;

    /// Waits up to `timeout` for a clickable element matching `locator`
    ///
    /// Returns `RenderError::Timeout` when the wait expires.
    async fn wait_for_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> RenderResult<Element>;

    /// Activates a control previously returned by `wait_for_clickable`
    async fn click(&mut self, element: &Element) -> RenderResult<()>;

    /// Releases the session. Safe to call more than once.
    async fn close(&mut self) -> RenderResult<()>;
}
