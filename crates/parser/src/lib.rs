use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, RwLock};
use tracing::debug;
use vigil_core::{Locator, PageDriver, ProbeError};

/// A `PageDriver` over an HTML document held in memory.
///
/// The document can be swapped at any time through a [`SnapshotHandle`],
/// which lets tests replay the DOM mutations a live page would go through.
/// No script runs; visibility is derived from `hidden` attributes and inline
/// `display`/`visibility` styles.
pub struct SnapshotDriver {
    html: Arc<RwLock<String>>,
}

/// Cloneable writer for a [`SnapshotDriver`]'s document.
#[derive(Clone)]
pub struct SnapshotHandle {
    html: Arc<RwLock<String>>,
}

impl SnapshotHandle {
    pub fn replace(&self, html: impl Into<String>) {
        let html = html.into();
        match self.html.write() {
            Ok(mut guard) => *guard = html,
            Err(poisoned) => *poisoned.into_inner() = html,
        }
    }
}

impl SnapshotDriver {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: Arc::new(RwLock::new(html.into())),
        }
    }

    /// Fetch a page over HTTP and snapshot its server-rendered markup.
    pub async fn fetch(url: &str) -> Result<Self, ProbeError> {
        Self::fetch_with(&Client::new(), url).await
    }

    pub async fn fetch_with(client: &Client, url: &str) -> Result<Self, ProbeError> {
        let html = client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::fetch_error(e.to_string()))?
            .text()
            .await
            .map_err(|e| ProbeError::fetch_error(e.to_string()))?;
        debug!(url, bytes = html.len(), "fetched snapshot");
        Ok(Self::from_html(html))
    }

    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle {
            html: Arc::clone(&self.html),
        }
    }

    pub fn replace(&self, html: impl Into<String>) {
        self.handle().replace(html);
    }

    fn with_document<T>(&self, f: impl FnOnce(&Html) -> Result<T, ProbeError>) -> Result<T, ProbeError> {
        let source = match self.html.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let document = Html::parse_document(&source);
        f(&document)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ProbeError> {
    Selector::parse(selector)
        .map_err(|e| ProbeError::parsing_error(format!("Invalid selector '{}': {}", selector, e)))
}

fn normalized_text(el: &ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn own_text(el: &ElementRef) -> String {
    el.children()
        .filter_map(|child| child.value().as_text().map(|t| &**t))
        .collect::<String>()
}

/// Elements matched by `locator`, in document order.
fn resolve<'a>(document: &'a Html, locator: &Locator) -> Result<Vec<ElementRef<'a>>, ProbeError> {
    match locator {
        Locator::Text(needle) => {
            let needle = needle.to_lowercase();
            let all = parse_selector("body *")?;
            Ok(document
                .select(&all)
                .filter(|el| !matches!(el.value().name(), "script" | "style" | "template"))
                .filter(|el| own_text(el).to_lowercase().contains(&needle))
                .collect())
        }
        other => {
            // as_css only returns None for text locators
            let css = other.as_css().unwrap_or_default();
            let selector = parse_selector(&css)?;
            Ok(document.select(&selector).collect())
        }
    }
}

fn hides(el: &ElementRef) -> bool {
    let element = el.value();
    if element.attr("hidden").is_some() {
        return true;
    }
    if matches!(element.name(), "head" | "script" | "style" | "template" | "noscript") {
        return true;
    }
    let style = element
        .attr("style")
        .unwrap_or("")
        .to_ascii_lowercase()
        .replace(char::is_whitespace, "");
    style.contains("display:none") || style.contains("visibility:hidden")
}

fn is_rendered(el: &ElementRef) -> bool {
    if hides(el) {
        return false;
    }
    !el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| hides(&ancestor))
}

fn body_text(document: &Html) -> Result<String, ProbeError> {
    let body = parse_selector("body")?;
    let Some(body) = document.select(&body).next() else {
        return Ok(String::new());
    };
    let words: Vec<&str> = body
        .descendants()
        .filter(|node| {
            node.parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .map_or(true, |name| !matches!(name, "script" | "style" | "template"))
        })
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .flat_map(str::split_whitespace)
        .collect();
    Ok(words.join(" "))
}

#[async_trait]
impl PageDriver for SnapshotDriver {
    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, ProbeError> {
        self.with_document(|doc| {
            Ok(resolve(doc, locator)?.iter().map(normalized_text).collect())
        })
    }

    async fn count(&self, locator: &Locator) -> Result<usize, ProbeError> {
        self.with_document(|doc| Ok(resolve(doc, locator)?.len()))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, ProbeError> {
        self.with_document(|doc| Ok(resolve(doc, locator)?.iter().any(is_rendered)))
    }

    async fn body_text(&self) -> Result<String, ProbeError> {
        self.with_document(body_text)
    }
}
