use std::path::{Path, PathBuf};

use classmatch_core::config::ScheduleConfig;
use classmatch_core::model::ScheduleEntry;
use classmatch_core::pipeline::{parse_pages, ParseOutcome};
use colored::Colorize;
use log::info;

use crate::extractor::{
    extract_pages, DocumentExtractor, DroppedPage, ExtractionArgs, ExtractionOptions,
};
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ParseOptions {
    /// Extractor output: a JSON page dump or plain text with form-feed page breaks
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    #[clap(flatten)]
    pub extraction: ExtractionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// A parsed document together with the pages that could not be extracted.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    #[serde(flatten)]
    pub outcome: ParseOutcome,
    pub dropped_pages: Vec<DroppedPage>,
}

/// Extract and parse `document`. Zero recovered entries is an error.
pub async fn parse_document(
    document: &Path,
    extraction: &ExtractionArgs,
    config: &ScheduleConfig,
    global: &crate::Global,
) -> Result<ParsedDocument> {
    let mut extractor = DocumentExtractor::open(document).await?;
    let report = extract_pages(&mut extractor, &ExtractionOptions::from(extraction)).await;

    let normalizer = config.normalizer();
    let parse_options = config.parse_options(global.location.clone());
    let outcome = parse_pages(&report.pages, &normalizer, &parse_options);

    if global.verbose {
        eprintln!(
            "{} page(s) extracted, {} dropped, location {:?}",
            report.pages.len(),
            report.dropped.len(),
            outcome.location
        );
    }

    if outcome.is_empty() {
        return Err(Error::NoScheduleData.into());
    }
    info!("{}: {} entries", document.display(), outcome.entries.len());

    Ok(ParsedDocument {
        outcome,
        dropped_pages: report.dropped,
    })
}

pub async fn run(options: ParseOptions, global: crate::Global) -> Result<()> {
    let config = crate::settings::load_config(&global)?;
    let parsed = parse_document(&options.document, &options.extraction, &config, &global).await?;

    if options.json {
        println!("{}", format_parse_json(&parsed)?);
    } else {
        println!("{}", format_parse_text(&parsed));
    }

    Ok(())
}

fn format_parse_json(parsed: &ParsedDocument) -> Result<String> {
    serde_json::to_string_pretty(parsed).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

pub fn entries_table(entries: &[ScheduleEntry]) -> prettytable::Table {
    let mut table = crate::prelude::new_table();
    table.set_titles(prettytable::row!["Day", "Time", "Class", "Trainer", "Location", "Theme"]);

    for entry in entries {
        table.add_row(prettytable::row![
            entry.day,
            entry.time,
            entry.class_name,
            entry.trainer,
            entry.location,
            entry.theme.as_deref().unwrap_or("")
        ]);
    }

    table
}

fn format_parse_text(parsed: &ParsedDocument) -> String {
    let outcome = &parsed.outcome;
    let mut result = String::new();

    result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!(
        "{}\n",
        f!(
            "PARSED SCHEDULE ({} entries, {} day(s))",
            outcome.entries.len(),
            outcome.days_recovered.len()
        )
        .bright_cyan()
        .bold()
    ));
    result.push_str(&f!("{}\n\n", "=".repeat(80).bright_cyan()));

    result.push_str(&entries_table(&outcome.entries).to_string());

    for dropped in &parsed.dropped_pages {
        result.push_str(&f!(
            "\n{} page {}: {}",
            "dropped".yellow().bold(),
            dropped.page,
            dropped.reason
        ));
    }

    result
}
