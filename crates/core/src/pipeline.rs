//! End-to-end parse: extracted pages in, schedule entries out.
//!
//! ```text
//! ExtractedPage[] -> layout::reconstruct -> extract::extract_line
//!                 -> assemble (normalize + validate + dedupe)
//! ```

use std::collections::BTreeSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::assemble::{assemble, Candidate, SeenKeys};
use crate::extract::{extract_line, ExtractConfig};
use crate::layout::{reconstruct, LayoutConfig};
use crate::model::{ExtractedPage, ScheduleEntry, Weekday};
use crate::normalize::Normalizer;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub layout: LayoutConfig,
    pub extract: ExtractConfig,
    /// Location to stamp on every entry. Detected from the document text
    /// when absent.
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutcome {
    pub entries: Vec<ScheduleEntry>,
    /// Weekdays for which at least one entry was produced.
    pub days_recovered: BTreeSet<Weekday>,
    pub location: String,
}

impl ParseOutcome {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn page_text(page: &ExtractedPage) -> String {
    match page {
        ExtractedPage::Text(text) => text.clone(),
        ExtractedPage::Fragments(fragments) => fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Resolve the location for a document: the explicit option if given,
/// otherwise the first studio named anywhere in the pages.
pub fn resolve_location(
    pages: &[ExtractedPage],
    normalizer: &Normalizer,
    options: &ParseOptions,
) -> String {
    if let Some(location) = options.location.as_deref().filter(|l| !l.trim().is_empty()) {
        return normalizer.normalize_location(location);
    }
    pages
        .iter()
        .find_map(|page| normalizer.detect_location(&page_text(page)))
        .unwrap_or_default()
}

/// Parse every page of a document into schedule entries.
///
/// Entries keep page order, then weekday order, then line order. Duplicate
/// identity keys are dropped across the whole document but never across
/// separate calls.
pub fn parse_pages(
    pages: &[ExtractedPage],
    normalizer: &Normalizer,
    options: &ParseOptions,
) -> ParseOutcome {
    let location = resolve_location(pages, normalizer, options);
    let mut seen = SeenKeys::new();
    let mut entries = Vec::new();

    for (page_idx, page) in pages.iter().enumerate() {
        let day_lines = reconstruct(page, &options.layout);
        debug!(
            "page {}: {} day(s) with lines",
            page_idx + 1,
            day_lines.len()
        );

        let candidates = day_lines.into_iter().flat_map(|(day, lines)| {
            let location = location.clone();
            lines
                .into_iter()
                .flat_map(|line| extract_line(&line, &options.extract))
                .map(move |entry| Candidate {
                    day,
                    entry,
                    location: location.clone(),
                })
                .collect::<Vec<_>>()
        });

        entries.extend(assemble(candidates, normalizer, &mut seen));
    }

    let days_recovered = entries.iter().map(|e| e.day).collect();
    info!(
        "parsed {} entr{} from {} page(s)",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        pages.len()
    );

    ParseOutcome {
        entries,
        days_recovered,
        location,
    }
}

/// Parse a single plain-text page.
pub fn parse_text(text: &str, normalizer: &Normalizer, options: &ParseOptions) -> ParseOutcome {
    parse_pages(&[ExtractedPage::Text(text.to_string())], normalizer, options)
}
