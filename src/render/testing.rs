//! In-memory renderer for unit tests

use crate::render::document::{Element, HtmlDocument, Locator};
use crate::render::{PageRenderer, RenderSession};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Serves canned pages by URL and records what happened
#[derive(Debug, Default)]
pub(crate) struct StaticSite {
    pages: HashMap<String, String>,
    /// Session creation number (1-based) that fails
    fail_session: Option<usize>,
    /// Selector whose queries fail on every session
    fail_selector: Option<String>,
    sessions_opened: AtomicUsize,
    sessions_closed: Arc<AtomicUsize>,
    navigations: Arc<Mutex<Vec<String>>>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn fail_session(mut self, number: usize) -> Self {
        self.fail_session = Some(number);
        self
    }

    pub fn fail_selector(mut self, selector: &str) -> Self {
        self.fail_selector = Some(selector.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.sessions_closed.load(Ordering::SeqCst)
    }

    /// A session already showing `url`, for extractor tests
    pub fn session_at(&self, url: &str) -> StaticSession {
        let mut session = self.open();
        session.load(url).unwrap();
        session
    }

    fn open(&self) -> StaticSession {
        StaticSession {
            pages: self.pages.clone(),
            fail_selector: self.fail_selector.clone(),
            document: None,
            closed: false,
            sessions_closed: Arc::clone(&self.sessions_closed),
            navigations: Arc::clone(&self.navigations),
        }
    }
}

#[async_trait]
impl PageRenderer for StaticSite {
    type Session = StaticSession;

    async fn new_session(&self) -> RenderResult<StaticSession> {
        let number = self.sessions_opened.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_session == Some(number) {
            return Err(RenderError::Session(format!(
                "browser failed to start (session #{})",
                number
            )));
        }
        Ok(self.open())
    }
}

pub(crate) struct StaticSession {
    pages: HashMap<String, String>,
    fail_selector: Option<String>,
    document: Option<HtmlDocument>,
    closed: bool,
    sessions_closed: Arc<AtomicUsize>,
    navigations: Arc<Mutex<Vec<String>>>,
}

impl StaticSession {
    fn load(&mut self, url: &str) -> RenderResult<()> {
        self.navigations.lock().unwrap().push(url.to_string());
        let body = self.pages.get(url).ok_or_else(|| RenderError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        let parsed = Url::parse(url).map_err(|source| RenderError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        self.document = Some(HtmlDocument::new(parsed, body.clone()));
        Ok(())
    }

    fn document(&self) -> RenderResult<&HtmlDocument> {
        self.document.as_ref().ok_or(RenderError::NotNavigated)
    }
}

#[async_trait]
impl RenderSession for StaticSession {
    async fn navigate(&mut self, url: &str) -> RenderResult<()> {
        self.load(url)
    }

    fn current_url(&self) -> Option<&Url> {
        self.document.as_ref().map(HtmlDocument::url)
    }

    fn query(&self, selector: &str) -> RenderResult<Vec<Element>> {
        if self.fail_selector.as_deref() == Some(selector) {
            return Err(RenderError::Session("renderer crashed".to_string()));
        }
        self.document()?.query(selector)
    }

    async fn wait_for_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> RenderResult<Element> {
        self.document()?
            .locate(locator)?
            .ok_or_else(|| RenderError::Timeout {
                what: locator.describe(),
                timeout,
            })
    }

    async fn click(&mut self, _element: &Element) -> RenderResult<()> {
        Ok(())
    }

    async fn close(&mut self) -> RenderResult<()> {
        if !self.closed {
            self.closed = true;
            self.sessions_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
