//! Text extraction collaborators: PDF parsing and web page fetching.
//!
//! Both live behind traits so the pipeline (and its tests) never depend on
//! a concrete parser or on the network.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};

/// Extracts plain text from PDF bytes.
pub trait PdfExtractor: Send + Sync {
    /// Extract the document's text, failing on parse errors
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// `pdf-extract`-backed extractor
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).context("Failed to extract text from PDF")
    }
}

/// Fetches a URL and returns the page's visible body text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch and extract, failing on network or HTTP errors
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher with a request timeout
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Build a fetcher whose requests abort after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {}", url))?
            .error_for_status()
            .with_context(|| format!("URL returned an error status: {}", url))?;

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body: {}", url))?;

        Ok(body_text(&html))
    }
}

/// Extract the text content of the `<body>` element, falling back to the
/// whole document when there is none
fn body_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("body") else {
        return document.root_element().text().collect::<Vec<_>>().join(" ");
    };

    match document.select(&selector).next() {
        Some(body) => body.text().collect::<Vec<_>>().join(" "),
        None => document.root_element().text().collect::<Vec<_>>().join(" "),
    }
}
