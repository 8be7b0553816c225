//! The asynchronous boundary with the token extractor.
//!
//! Pages are rendered and recognized strictly one at a time: rendering takes
//! `&mut self`, so a second render cannot start while one is in flight. Each
//! stage runs under its own timeout and a page that fails or times out is
//! dropped with a warning; the remaining pages are still processed.

use std::path::Path;
use std::time::Duration;

use classmatch_core::model::ExtractedPage;
use log::{debug, trace, warn};

use crate::prelude::*;

pub const RENDER_TIMEOUT_SECS: u64 = 10;
pub const RECOGNIZE_TIMEOUT_SECS: u64 = 15;
pub const PAGE_DELAY_MS: u64 = 300;

const FORM_FEED: char = '\u{000C}';

/// A page that has been rendered and is waiting for recognition.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub index: usize,
    pub content: ExtractedPage,
}

/// Source of positioned fragments or flat text, one page at a time.
pub trait TokenExtractor {
    fn page_count(&self) -> usize;

    async fn render(&mut self, index: usize) -> Result<RenderedPage, Error>;

    async fn recognize(&mut self, page: RenderedPage) -> Result<ExtractedPage, Error>;
}

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ExtractionArgs {
    /// Delay between consecutive pages, in milliseconds
    #[arg(long, env = "CLASSMATCH_PAGE_DELAY_MS", default_value_t = PAGE_DELAY_MS)]
    pub page_delay_ms: u64,

    /// Per-page render timeout, in seconds
    #[arg(long, default_value_t = RENDER_TIMEOUT_SECS)]
    pub render_timeout: u64,

    /// Per-page recognition timeout, in seconds
    #[arg(long, default_value_t = RECOGNIZE_TIMEOUT_SECS)]
    pub recognize_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub render_timeout: Duration,
    pub recognize_timeout: Duration,
    pub page_delay: Duration,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            render_timeout: Duration::from_secs(RENDER_TIMEOUT_SECS),
            recognize_timeout: Duration::from_secs(RECOGNIZE_TIMEOUT_SECS),
            page_delay: Duration::from_millis(PAGE_DELAY_MS),
        }
    }
}

impl From<&ExtractionArgs> for ExtractionOptions {
    fn from(args: &ExtractionArgs) -> Self {
        Self {
            render_timeout: Duration::from_secs(args.render_timeout),
            recognize_timeout: Duration::from_secs(args.recognize_timeout),
            page_delay: Duration::from_millis(args.page_delay_ms),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DroppedPage {
    /// 1-based page number.
    pub page: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub pages: Vec<ExtractedPage>,
    pub dropped: Vec<DroppedPage>,
}

async fn extract_page<E: TokenExtractor>(
    extractor: &mut E,
    index: usize,
    options: &ExtractionOptions,
) -> Result<ExtractedPage, Error> {
    let timed_out = |stage: &str, after: Duration| Error::Timeout {
        stage: stage.to_string(),
        page: index + 1,
        seconds: after.as_secs(),
    };

    let rendered = tokio::time::timeout(options.render_timeout, extractor.render(index))
        .await
        .map_err(|_| timed_out("render", options.render_timeout))??;
    trace!("page {} rendered", rendered.index + 1);

    tokio::time::timeout(options.recognize_timeout, extractor.recognize(rendered))
        .await
        .map_err(|_| timed_out("recognition", options.recognize_timeout))?
}

/// Run every page through render and recognition, in order.
pub async fn extract_pages<E: TokenExtractor>(
    extractor: &mut E,
    options: &ExtractionOptions,
) -> ExtractionReport {
    let mut report = ExtractionReport::default();
    let page_count = extractor.page_count();

    for index in 0..page_count {
        if index > 0 && !options.page_delay.is_zero() {
            tokio::time::sleep(options.page_delay).await;
        }

        match extract_page(extractor, index, options).await {
            Ok(page) => {
                debug!("page {}/{} extracted", index + 1, page_count);
                report.pages.push(page);
            }
            Err(err) => {
                warn!("dropping page {}: {}", index + 1, err);
                report.dropped.push(DroppedPage {
                    page: index + 1,
                    reason: err.to_string(),
                });
            }
        }
    }

    report
}

#[derive(Debug, serde::Deserialize)]
struct DocumentDump {
    pages: Vec<ExtractedPage>,
}

/// A document whose extraction already happened: a JSON dump of pages, or
/// plain text with pages separated by form feeds.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    pages: Vec<ExtractedPage>,
}

impl DocumentExtractor {
    pub async fn open(path: &Path) -> Result<Self, Error> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Document(f!("{}: {e}", path.display())))?;
        Self::from_content(&content)
    }

    pub fn from_content(content: &str) -> Result<Self, Error> {
        if content.trim_start().starts_with('{') {
            let dump: DocumentDump =
                serde_json::from_str(content).map_err(|e| Error::Document(e.to_string()))?;
            return Ok(Self { pages: dump.pages });
        }

        let pages = content
            .split(FORM_FEED)
            .filter(|page| !page.trim().is_empty())
            .map(|page| ExtractedPage::Text(page.to_string()))
            .collect();
        Ok(Self { pages })
    }
}

impl TokenExtractor for DocumentExtractor {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn render(&mut self, index: usize) -> Result<RenderedPage, Error> {
        let content = self
            .pages
            .get(index)
            .cloned()
            .ok_or_else(|| Error::Extraction {
                stage: "render".to_string(),
                page: index + 1,
                message: "page out of range".to_string(),
            })?;
        Ok(RenderedPage { index, content })
    }

    async fn recognize(&mut self, page: RenderedPage) -> Result<ExtractedPage, Error> {
        Ok(page.content)
    }
}
