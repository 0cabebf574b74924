//! HTTP renderer implementation
//!
//! This backend loads pages with `reqwest` and answers structural queries
//! with `scraper`. It covers:
//! - Building one HTTP client per session from the capability profile
//! - GET requests with status and Content-Type classification
//! - Static "clicks": following a control's link target when it has one
//!
//! Content produced by client-side scripts is not visible to this backend.

use crate::config::RendererConfig;
use crate::render::document::{Element, HtmlDocument, Locator};
use crate::render::{PageRenderer, RenderSession};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client from the renderer capability profile
///
/// # Example
///
/// ```no_run
/// use listing_scraper::config::RendererConfig;
/// use listing_scraper::render::build_http_client;
///
/// let client = build_http_client(&RendererConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RendererConfig) -> RenderResult<Client> {
    let mut headers = HeaderMap::new();
    let language = HeaderValue::from_str(&config.accept_language)
        .map_err(|e| RenderError::Session(format!("invalid accept-language: {}", e)))?;
    headers.insert(ACCEPT_LANGUAGE, language);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .https_only(config.https_only)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| RenderError::Session(e.to_string()))
}

/// Renderer that opens plain HTTP sessions
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    profile: RendererConfig,
}

impl HttpRenderer {
    pub fn new(profile: RendererConfig) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    type Session = HttpSession;

    async fn new_session(&self) -> RenderResult<HttpSession> {
        // A fresh client per session: no connection or cookie carry-over
        let client = build_http_client(&self.profile)?;
        Ok(HttpSession {
            client: Some(client),
            document: None,
        })
    }
}

/// One HTTP session holding at most one loaded document
#[derive(Debug)]
pub struct HttpSession {
    client: Option<Client>,
    document: Option<HtmlDocument>,
}

impl HttpSession {
    fn document(&self) -> RenderResult<&HtmlDocument> {
        self.document.as_ref().ok_or(RenderError::NotNavigated)
    }
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> RenderResult<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RenderError::Session("session already closed".to_string()))?;

        let target = Url::parse(url).map_err(|source| RenderError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = client
            .get(target)
            .send()
            .await
            .map_err(|source| RenderError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(RenderError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| RenderError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::trace!("Loaded {} ({} bytes)", final_url, body.len());
        self.document = Some(HtmlDocument::new(final_url, body));
        Ok(())
    }

    fn current_url(&self) -> Option<&Url> {
        self.document.as_ref().map(HtmlDocument::url)
    }

    fn query(&self, selector: &str) -> RenderResult<Vec<Element>> {
        self.document()?.query(selector)
    }

    async fn wait_for_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> RenderResult<Element> {
        // A static document never changes, so one look settles the wait
        self.document()?
            .locate(locator)?
            .ok_or_else(|| RenderError::Timeout {
                what: locator.describe(),
                timeout,
            })
    }

    async fn click(&mut self, element: &Element) -> RenderResult<()> {
        let Some(href) = element.attribute("href") else {
            // Panel content is already part of the static markup
            return Ok(());
        };

        let base = self.document()?.url().clone();
        let target = base.join(href).map_err(|source| RenderError::InvalidUrl {
            url: href.to_string(),
            source,
        })?;
        self.navigate(target.as_str()).await
    }

    async fn close(&mut self) -> RenderResult<()> {
        self.document = None;
        self.client = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&RendererConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_accept_language() {
        let profile = RendererConfig {
            accept_language: "bad\nvalue".to_string(),
            ..RendererConfig::default()
        };
        assert!(matches!(
            build_http_client(&profile),
            Err(RenderError::Session(_))
        ));
    }

    #[tokio::test]
    async fn test_query_before_navigate() {
        let renderer = HttpRenderer::new(RendererConfig::default());
        let session = renderer.new_session().await.unwrap();
        assert!(matches!(session.query("a"), Err(RenderError::NotNavigated)));
        assert!(session.current_url().is_none());
    }

    #[tokio::test]
    async fn test_navigate_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(html(r#"<html><body><p class="v">hello</p></body></html>"#))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(RendererConfig::default());
        let mut session = renderer.new_session().await.unwrap();
        session
            .navigate(&format!("{}/page", server.uri()))
            .await
            .unwrap();

        let found = session.query(".v").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text(), "hello");
        assert!(session.current_url().unwrap().as_str().ends_with("/page"));
    }

    #[tokio::test]
    async fn test_navigate_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(RendererConfig::default());
        let mut session = renderer.new_session().await.unwrap();
        let result = session.navigate(&format!("{}/down", server.uri())).await;
        assert!(matches!(result, Err(RenderError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_navigate_content_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(RendererConfig::default());
        let mut session = renderer.new_session().await.unwrap();
        let result = session.navigate(&format!("{}/api", server.uri())).await;
        assert!(matches!(result, Err(RenderError::ContentMismatch { .. })));
    }

    #[tokio::test]
    async fn test_wait_for_missing_control_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html("<html><body><div>nothing</div></body></html>"))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(RendererConfig::default());
        let mut session = renderer.new_session().await.unwrap();
        session.navigate(&server.uri()).await.unwrap();

        let locator = Locator::Text {
            selector: "div".to_string(),
            text: "معلومات الإعلان".to_string(),
        };
        let result = session
            .wait_for_clickable(&locator, Duration::from_millis(10))
            .await;
        assert!(matches!(result, Err(RenderError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_click_follows_link_target() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ad/1"))
            .respond_with(html(r#"<html><body><a id="tab" href="/ad/1/info">info</a></body></html>"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ad/1/info"))
            .respond_with(html(r#"<html><body><p id="panel">panel</p></body></html>"#))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(RendererConfig::default());
        let mut session = renderer.new_session().await.unwrap();
        session
            .navigate(&format!("{}/ad/1", server.uri()))
            .await
            .unwrap();

        let tab = session
            .wait_for_clickable(&Locator::Css("#tab".to_string()), Duration::from_secs(1))
            .await
            .unwrap();
        session.click(&tab).await.unwrap();

        assert_eq!(session.query("#panel").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_navigate_after_close_fails() {
        let renderer = HttpRenderer::new(RendererConfig::default());
        let mut session = renderer.new_session().await.unwrap();
        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(matches!(
            session.navigate("https://example.com/").await,
            Err(RenderError::Session(_))
        ));
    }
}
