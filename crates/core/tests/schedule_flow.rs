use std::collections::BTreeMap;
use std::path::PathBuf;

use classmatch_core::align::{build_alignment, AlignOptions, AlignmentKind};
use classmatch_core::extract::ExtractConfig;
use classmatch_core::model::{group_by_day, ScheduleEntry, Weekday};
use classmatch_core::normalize::Normalizer;
use classmatch_core::pipeline::{parse_text, ParseOptions, ParseOutcome};
use classmatch_core::reconcile::{
    compare_strict, reconcile, summarize, MatchStrategy, ReconcileOptions,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn parse_fixture(name: &str) -> ParseOutcome {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    parse_text(&text, Normalizer::builtin(), &ParseOptions::default())
}

fn authoritative_entry(day: Weekday, time: &str, class: &str, trainer: &str) -> ScheduleEntry {
    ScheduleEntry::new(day, time, class, trainer, "Kwality House, Kemps Corner")
}

fn count_by_day(outcome: &ParseOutcome) -> BTreeMap<Weekday, usize> {
    let mut counts = BTreeMap::new();
    for entry in &outcome.entries {
        *counts.entry(entry.day).or_insert(0) += 1;
    }
    counts
}

// -------------------------------------------------------------------------
// Merged two-day header
// -------------------------------------------------------------------------

#[test]
fn merged_header_distributes_across_days() {
    let outcome = parse_fixture("merged-columns.txt");
    let counts = count_by_day(&outcome);

    assert!(counts[&Weekday::Monday] >= 1);
    assert!(counts[&Weekday::Tuesday] >= 1);
    assert_eq!(
        counts[&Weekday::Monday] + counts[&Weekday::Tuesday],
        outcome.entries.len()
    );
}

#[test]
fn merged_header_reconciles_against_authoritative() {
    let outcome = parse_fixture("merged-columns.txt");
    let authoritative = group_by_day(&[
        authoritative_entry(Weekday::Monday, "7:15 AM", "Studio Strength Lab (Pull)", "Anisha Shah"),
        authoritative_entry(Weekday::Monday, "7:30 AM", "Studio Barre 57", "Simonelle De Vitre"),
        authoritative_entry(Weekday::Tuesday, "7:30 AM", "Studio PowerCycle", "Richard D'Costa"),
        authoritative_entry(Weekday::Tuesday, "7:30 AM", "Studio FIT", "Pranjali Jain"),
    ]);

    let results = reconcile(&outcome.entries, &authoritative, &ReconcileOptions::default());
    let summary = summarize(&results);

    assert!(summary.matched > 0);
    // FIT is taught by Pramal in the derived schedule, not Pranjali.
    assert_eq!(summary.matched, 3);
    assert_eq!(summary.unmatched_derived, 1);
    assert_eq!(summary.unmatched_authoritative, 1);
    assert_eq!(
        summary.matched + summary.unmatched_authoritative + summary.unmatched_derived,
        summary.total
    );
}

#[test]
fn strict_mode_names_the_differing_field() {
    let outcome = parse_fixture("merged-columns.txt");
    let authoritative = group_by_day(&[authoritative_entry(
        Weekday::Tuesday,
        "7:30 AM",
        "Studio FIT",
        "Pranjali Jain",
    )]);
    let fit: Vec<ScheduleEntry> = outcome
        .entries
        .into_iter()
        .filter(|e| e.class_name == "Studio FIT")
        .collect();

    let results = compare_strict(&fit, &authoritative);
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_match);
    assert_eq!(results[0].mismatch_reason, "mismatched fields: trainer");
}

// -------------------------------------------------------------------------
// Ambiguous hours
// -------------------------------------------------------------------------

#[test]
fn ambiguous_hour_kept_by_default() {
    let outcome = parse_text(
        "MONDAY\n1:30 AM MAT 57 - Anisha",
        Normalizer::builtin(),
        &ParseOptions::default(),
    );
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].time, "1:30 AM");
}

#[test]
fn ambiguous_hour_remapped_when_enabled() {
    let options = ParseOptions {
        extract: ExtractConfig {
            remap_ambiguous_hours: true,
        },
        ..ParseOptions::default()
    };
    let outcome = parse_text("MONDAY\n1:30 AM MAT 57 - Anisha", Normalizer::builtin(), &options);
    assert_eq!(outcome.entries[0].time, "11:30 AM");
}

// -------------------------------------------------------------------------
// Realistic week
// -------------------------------------------------------------------------

#[test]
fn full_week_document() {
    let outcome = parse_fixture("kemps-week.txt");

    assert_eq!(outcome.location, "Kwality House, Kemps Corner");
    let counts = count_by_day(&outcome);
    assert_eq!(counts[&Weekday::Monday], 3);
    assert_eq!(counts[&Weekday::Wednesday], 2);
    assert_eq!(counts[&Weekday::Friday] + counts[&Weekday::Saturday], 5);
    assert!(counts[&Weekday::Friday] >= 1 && counts[&Weekday::Saturday] >= 1);

    let mat = outcome
        .entries
        .iter()
        .find(|e| e.class_name == "Studio Mat 57")
        .expect("mat class");
    assert_eq!(mat.trainer, "Richard D'Costa");
    assert_eq!(mat.theme.as_deref(), Some("Retro Night"));

    let fit = outcome
        .entries
        .iter()
        .find(|e| e.class_name == "Studio FIT")
        .expect("fit class");
    assert_eq!(fit.time, "9:00 AM");

    let blaze = outcome
        .entries
        .iter()
        .find(|e| e.trainer == "Mrigakshi Jaiswal")
        .expect("blaze class");
    assert_eq!(blaze.class_name, "Studio Back Body Blaze");
    assert_eq!(blaze.time, "7:30 PM");
}

#[test]
fn identity_keys_are_unique() {
    let outcome = parse_fixture("kemps-week.txt");
    let mut keys: Vec<&str> = outcome.entries.iter().map(|e| e.identity_key.as_str()).collect();
    let total = keys.len();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

#[test]
fn empty_sides_are_one_sided() {
    let outcome = parse_fixture("merged-columns.txt");
    let results = reconcile(&outcome.entries, &BTreeMap::new(), &ReconcileOptions::default());
    assert_eq!(results.len(), outcome.entries.len());
    assert!(results.iter().all(|r| !r.is_match && r.authoritative.is_none()));

    let authoritative = group_by_day(&outcome.entries);
    let results = reconcile(&[], &authoritative, &ReconcileOptions::default());
    assert_eq!(results.len(), outcome.entries.len());
    assert!(results.iter().all(|r| !r.is_match && r.derived.is_none()));
}

#[test]
fn self_reconciliation_matches_everything() {
    let outcome = parse_fixture("kemps-week.txt");
    let authoritative = group_by_day(&outcome.entries);
    for strategy in [MatchStrategy::Greedy, MatchStrategy::Optimal] {
        let options = ReconcileOptions {
            strategy,
            ..ReconcileOptions::default()
        };
        let summary = summarize(&reconcile(&outcome.entries, &authoritative, &options));
        assert_eq!(summary.matched, outcome.entries.len());
        assert_eq!(summary.total, outcome.entries.len());
    }
}

#[test]
fn alignment_of_parsed_week() {
    let outcome = parse_fixture("merged-columns.txt");
    let derived = group_by_day(&outcome.entries);
    let authoritative = group_by_day(&[
        authoritative_entry(Weekday::Monday, "7:15 AM", "Studio Strength Lab (Pull)", "Anisha Shah"),
        authoritative_entry(Weekday::Tuesday, "7:30 AM", "Studio FIT", "Pranjali Jain"),
    ]);

    let alignment = build_alignment(&derived, &authoritative, &AlignOptions::default());
    let monday: Vec<AlignmentKind> = alignment[&Weekday::Monday].iter().map(|r| r.kind).collect();
    assert_eq!(monday, vec![AlignmentKind::Match, AlignmentKind::DerivedOnly]);

    let tuesday = &alignment[&Weekday::Tuesday];
    assert!(tuesday
        .iter()
        .any(|r| r.kind == AlignmentKind::TrainerMismatch));
    assert!(tuesday.iter().all(|r| r.time_key == "07:30"));
}
