use std::path::PathBuf;

use classmatch_core::model::{AuthoritativeSchedule, ComparisonResult, ScheduleEntry};
use classmatch_core::reconcile::{
    compare_strict, reconcile, summarize, MatchStrategy, ReconSummary,
};
use colored::Colorize;

use crate::authoritative::load_authoritative;
use crate::extractor::ExtractionArgs;
use crate::parse::parse_document;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReconcileOptions {
    /// Extractor output: a JSON page dump or plain text with form-feed page breaks
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Authoritative schedule (CSV with day, time, class, trainer[, location])
    #[arg(value_name = "AUTHORITATIVE")]
    pub authoritative: PathBuf,

    #[clap(flatten)]
    pub extraction: ExtractionArgs,

    /// Time tolerance in minutes; overrides the configuration
    #[arg(short, long, env = "CLASSMATCH_TOLERANCE")]
    pub tolerance: Option<u32>,

    /// Pair entries strictly and report every differing field
    #[arg(long)]
    pub strict: bool,

    /// Use minimum-cost assignment instead of first-come matching
    #[arg(long, conflicts_with = "strict")]
    pub optimal: bool,

    /// Only match entries at the same location
    #[arg(long)]
    pub same_location: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ReconcileReport {
    pub summary: ReconSummary,
    pub results: Vec<ComparisonResult>,
}

pub async fn run(options: ReconcileOptions, global: crate::Global) -> Result<()> {
    let mut config = crate::settings::load_config(&global)?;
    if let Some(tolerance) = options.tolerance {
        config.reconcile.time_tolerance_minutes = tolerance;
    }
    if options.optimal {
        config.reconcile.strategy = MatchStrategy::Optimal;
    }
    if options.same_location {
        config.reconcile.require_same_location = true;
    }

    let parsed = parse_document(&options.document, &options.extraction, &config, &global).await?;
    let schedule = load_authoritative(
        &options.authoritative,
        &parsed.outcome.location,
        &config.normalizer(),
    )
    .await?;

    let results = if options.strict {
        compare_strict(&parsed.outcome.entries, &schedule)
    } else {
        reconcile(&parsed.outcome.entries, &schedule, &config.reconcile)
    };
    let report = build_report(results);

    if options.json {
        println!("{}", format_reconcile_json(&report)?);
    } else {
        println!("{}", format_reconcile_text(&report, &schedule));
    }

    Ok(())
}

pub fn build_report(results: Vec<ComparisonResult>) -> ReconcileReport {
    ReconcileReport {
        summary: summarize(&results),
        results,
    }
}

fn format_reconcile_json(report: &ReconcileReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn describe(entry: Option<&ScheduleEntry>) -> String {
    entry
        .map(|e| f!("{} {} / {}", e.time, e.class_name, e.trainer))
        .unwrap_or_else(|| "-".to_string())
}

fn status(result: &ComparisonResult) -> String {
    if result.is_match && result.discrepancy_fields.is_empty() {
        "match".green().to_string()
    } else if result.is_match {
        "match*".bright_green().to_string()
    } else if result.derived.is_none() {
        "missing".red().to_string()
    } else if result.authoritative.is_none() {
        "extra".yellow().to_string()
    } else {
        "mismatch".bright_red().to_string()
    }
}

fn notes(result: &ComparisonResult) -> String {
    if !result.mismatch_reason.is_empty() {
        return result.mismatch_reason.clone();
    }
    if result.discrepancy_fields.is_empty() {
        return String::new();
    }
    let fields: Vec<String> = result.discrepancy_fields.iter().map(|f| f.to_string()).collect();
    f!("differs in {}", fields.join(", "))
}

fn format_reconcile_text(report: &ReconcileReport, schedule: &AuthoritativeSchedule) -> String {
    let mut result = String::new();

    result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!(
        "{}\n",
        f!(
            "RECONCILIATION ({} authoritative day(s))",
            schedule.len()
        )
        .bright_cyan()
        .bold()
    ));
    result.push_str(&f!("{}\n\n", "=".repeat(80).bright_cyan()));

    let mut table = crate::prelude::new_table();
    table.set_titles(prettytable::row!["Status", "Day", "Authoritative", "Derived", "Notes"]);
    for item in &report.results {
        let day = item
            .derived
            .as_ref()
            .or(item.authoritative.as_ref())
            .map(|e| e.day.to_string())
            .unwrap_or_default();
        table.add_row(prettytable::row![
            status(item),
            day,
            describe(item.authoritative.as_ref()),
            describe(item.derived.as_ref()),
            notes(item)
        ]);
    }
    result.push_str(&table.to_string());

    let summary = &report.summary;
    result.push_str(&f!("\n{}\n", "SUMMARY".bright_yellow().bold()));
    result.push_str(&f!(
        "  {}: {} | {}: {} | {}: {} | {}: {} | {}: {}\n",
        "Matched".green(),
        summary.matched.to_string().bright_white(),
        "Missing".green(),
        summary.unmatched_authoritative.to_string().bright_white(),
        "Extra".green(),
        summary.unmatched_derived.to_string().bright_white(),
        "Field mismatches".green(),
        summary.field_mismatches.to_string().bright_white(),
        "Total".green(),
        summary.total.to_string().bright_white()
    ));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use classmatch_core::config::ScheduleConfig;
    use classmatch_core::model::{group_by_day, Weekday};
    use classmatch_core::pipeline::parse_text;
    use classmatch_core::reconcile::ReconcileOptions as MatchOptions;

    use crate::authoritative::parse_authoritative;

    fn entry(time: &str, class: &str, trainer: &str) -> ScheduleEntry {
        ScheduleEntry::new(Weekday::Monday, time, class, trainer, "")
    }

    fn sample() -> (Vec<ScheduleEntry>, AuthoritativeSchedule) {
        let authoritative = group_by_day(&[
            entry("7:15 AM", "Studio Barre 57", "Anisha Shah"),
            entry("8:30 AM", "Studio FIT", "Karan Bhatia"),
        ]);
        let derived = vec![
            entry("7:17 AM", "Studio Barre 57", "Anisha Shah"),
            entry("6:00 PM", "Studio PowerCycle", "Richard D'Costa"),
        ];
        (derived, authoritative)
    }

    #[test]
    fn test_report_summary() {
        let (derived, authoritative) = sample();
        let report = build_report(reconcile(&derived, &authoritative, &MatchOptions::default()));

        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.summary.unmatched_derived, 1);
        assert_eq!(report.summary.unmatched_authoritative, 1);
        assert_eq!(report.summary.total, 3);
    }

    #[test]
    fn test_tolerant_match_notes_time_difference() {
        let (derived, authoritative) = sample();
        let report = build_report(reconcile(&derived, &authoritative, &MatchOptions::default()));

        assert!(report.results[0].is_match);
        assert_eq!(notes(&report.results[0]), "differs in time");
        assert_eq!(notes(&report.results[1]), "no matching authoritative entry found");
    }

    #[test]
    fn test_format_reconcile_text() {
        let (derived, authoritative) = sample();
        let report = build_report(reconcile(&derived, &authoritative, &MatchOptions::default()));
        let text = format_reconcile_text(&report, &authoritative);

        assert!(text.contains("RECONCILIATION (1 authoritative day(s))"));
        assert!(text.contains("7:15 AM Studio Barre 57 / Anisha Shah"));
        assert!(text.contains("SUMMARY"));
    }

    #[test]
    fn test_format_reconcile_json() {
        let (derived, authoritative) = sample();
        let report = build_report(compare_strict(&derived, &authoritative));
        let json = format_reconcile_json(&report).unwrap();

        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"isMatch\": false"));
        assert!(json.contains("mismatched fields: time"));
    }

    #[test]
    fn test_same_location_matches_csv_location_alias() {
        let config = ScheduleConfig::default();
        let normalizer = config.normalizer();
        let outcome = parse_text(
            "SUPREME HQ, BANDRA\nTUESDAY\n7:30 AM FIT - Pramal",
            &normalizer,
            &config.parse_options(None),
        );
        let authoritative = parse_authoritative(
            "Day,Time,Class,Trainer,Location\nTuesday,7:30 AM,Studio FIT,Pramal Hinduja,Supreme HQ\n",
            &outcome.location,
            &normalizer,
        )
        .unwrap();

        let options = MatchOptions {
            require_same_location: true,
            ..MatchOptions::default()
        };
        let report = build_report(reconcile(&outcome.entries, &authoritative, &options));

        assert_eq!(report.summary.matched, 1);
        assert_eq!(authoritative[&Weekday::Tuesday][0].location, "Supreme HQ, Bandra");
    }
}
