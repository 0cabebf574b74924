//! Loaded documents and the element snapshots queried out of them
//!
//! `scraper::Html` is not `Send`, so a document is kept as its source text
//! and parsed on each query. Queries hand back owned [`Element`] snapshots
//! that can be held across await points.

use crate::{RenderError, RenderResult};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// How to find an interactive control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// First element matching a CSS selector
    Css(String),
    /// First element matching `selector` whose own text contains `text`
    Text { selector: String, text: String },
}

impl Locator {
    pub fn describe(&self) -> String {
        match self {
            Self::Css(selector) => format!("`{}`", selector),
            Self::Text { selector, text } => format!("`{}` containing '{}'", selector, text),
        }
    }
}

/// Owned snapshot of one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    html: String,
    text: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            html: element.html(),
            text: collapse_whitespace(element.text()),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Builds a snapshot from the element's outer HTML
    ///
    /// Returns None when the markup holds no element.
    pub fn from_html(html: &str) -> Option<Self> {
        let fragment = Html::parse_fragment(html);
        let root = fragment.root_element();
        let element = root.children().find_map(ElementRef::wrap)?;
        Some(Self::from_ref(element))
    }

    /// Rendered text with runs of whitespace collapsed, trimmed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Descendants of this element matching `selector`, in document order
    pub fn query(&self, selector: &str) -> RenderResult<Vec<Element>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        let root = fragment.root_element();
        let Some(own) = root.children().find_map(ElementRef::wrap) else {
            return Ok(Vec::new());
        };

        Ok(own
            .select(&selector)
            .filter(|found| found.id() != own.id())
            .map(Element::from_ref)
            .collect())
    }

    /// First matching descendant
    pub fn query_one(&self, selector: &str) -> RenderResult<Option<Element>> {
        Ok(self.query(selector)?.into_iter().next())
    }
}

/// A loaded page: final URL plus markup
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    url: Url,
    body: String,
}

impl HtmlDocument {
    pub fn new(url: Url, body: String) -> Self {
        Self { url, body }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// All elements matching `selector`, in document order
    pub fn query(&self, selector: &str) -> RenderResult<Vec<Element>> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.body);
        Ok(document.select(&selector).map(Element::from_ref).collect())
    }

    /// First element satisfying the locator
    pub fn locate(&self, locator: &Locator) -> RenderResult<Option<Element>> {
        match locator {
            Locator::Css(selector) => Ok(self.query(selector)?.into_iter().next()),
            Locator::Text { selector, text } => {
                let parsed = parse_selector(selector)?;
                let document = Html::parse_document(&self.body);
                let found = document
                    .select(&parsed)
                    .find(|element| own_text(element).contains(text.as_str()))
                    .map(Element::from_ref);
                Ok(found)
            }
        }
    }
}

/// Parses a CSS selector, mapping failures into the renderer error type
pub fn parse_selector(selector: &str) -> RenderResult<Selector> {
    Selector::parse(selector).map_err(|e| RenderError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Text nodes that are direct children of the element
fn own_text(element: &ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
