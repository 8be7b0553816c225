use std::path::PathBuf;

use classmatch_core::align::{build_alignment, AlignedRow, Alignment, AlignmentKind};
use classmatch_core::model::{group_by_day, ScheduleEntry};
use colored::{ColoredString, Colorize};

use crate::authoritative::load_authoritative;
use crate::extractor::ExtractionArgs;
use crate::parse::parse_document;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct AlignOptions {
    /// Extractor output: a JSON page dump or plain text with form-feed page breaks
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Authoritative schedule (CSV with day, time, class, trainer[, location])
    #[arg(value_name = "AUTHORITATIVE")]
    pub authoritative: PathBuf,

    #[clap(flatten)]
    pub extraction: ExtractionArgs,

    /// Pair leftover entries whose times are this many minutes apart
    #[arg(short, long)]
    pub window: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: AlignOptions, global: crate::Global) -> Result<()> {
    let mut config = crate::settings::load_config(&global)?;
    if let Some(window) = options.window {
        config.align.time_window_minutes = window;
    }

    let parsed = parse_document(&options.document, &options.extraction, &config, &global).await?;
    let schedule = load_authoritative(
        &options.authoritative,
        &parsed.outcome.location,
        &config.normalizer(),
    )
    .await?;

    let derived = group_by_day(&parsed.outcome.entries);
    let alignment = build_alignment(&derived, &schedule, &config.align);

    if options.json {
        println!("{}", format_align_json(&alignment)?);
    } else {
        println!("{}", format_align_text(&alignment));
    }

    Ok(())
}

fn format_align_json(alignment: &Alignment) -> Result<String> {
    serde_json::to_string_pretty(alignment).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn colored_kind(kind: AlignmentKind) -> ColoredString {
    match kind {
        AlignmentKind::Match => kind.label().green(),
        AlignmentKind::TimeMismatch
        | AlignmentKind::ClassMismatch
        | AlignmentKind::TrainerMismatch => kind.label().yellow(),
        AlignmentKind::AuthoritativeOnly => kind.label().red(),
        AlignmentKind::DerivedOnly => kind.label().magenta(),
    }
}

fn cell(entry: Option<&ScheduleEntry>) -> String {
    entry
        .map(|e| f!("{} {}\n{}", e.time, e.class_name, e.trainer))
        .unwrap_or_else(|| "-".to_string())
}

fn day_table(rows: &[AlignedRow]) -> prettytable::Table {
    let mut table = crate::prelude::new_table();
    table.set_titles(prettytable::row!["Time", "Kind", "Authoritative", "Derived"]);
    for row in rows {
        table.add_row(prettytable::row![
            row.time_key,
            colored_kind(row.kind),
            cell(row.authoritative.as_ref()),
            cell(row.derived.as_ref())
        ]);
    }
    table
}

fn format_align_text(alignment: &Alignment) -> String {
    let mut result = String::new();

    for (day, rows) in alignment {
        let matches = rows.iter().filter(|r| r.kind == AlignmentKind::Match).count();
        result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
        result.push_str(&f!(
            "{}\n",
            f!("{} ({}/{} matched)", day.name().to_uppercase(), matches, rows.len())
                .bright_cyan()
                .bold()
        ));
        result.push_str(&f!("{}\n\n", "=".repeat(80).bright_cyan()));
        result.push_str(&day_table(rows).to_string());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use classmatch_core::align::AlignOptions as WindowOptions;
    use classmatch_core::model::Weekday;

    fn entry(day: Weekday, time: &str, class: &str, trainer: &str) -> ScheduleEntry {
        ScheduleEntry::new(day, time, class, trainer, "")
    }

    fn sample() -> Alignment {
        let authoritative = group_by_day(&[
            entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah"),
            entry(Weekday::Monday, "8:30 AM", "Studio FIT", "Karan Bhatia"),
        ]);
        let derived = group_by_day(&[
            entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah"),
            entry(Weekday::Tuesday, "6:00 PM", "Studio PowerCycle", "Richard D'Costa"),
        ]);
        build_alignment(&derived, &authoritative, &WindowOptions::default())
    }

    #[test]
    fn test_format_align_text_per_day() {
        let text = format_align_text(&sample());

        assert!(text.contains("MONDAY (1/2 matched)"));
        assert!(text.contains("TUESDAY (0/1 matched)"));
        assert!(text.contains("authoritative only"));
        assert!(text.contains("derived only"));
    }

    #[test]
    fn test_format_align_json() {
        let json = format_align_json(&sample()).unwrap();

        assert!(json.contains("\"Monday\""));
        assert!(json.contains("\"kind\": \"authoritative_only\""));
        assert!(json.contains("\"timeKey\": \"07:15\""));
    }
}
