//! Reconciling derived entries against the authoritative schedule.
//!
//! [`reconcile`] is the tolerant matcher: same weekday, times within a
//! tolerance, equivalent class names and compatible trainers. It pairs each
//! derived entry with the best still-unclaimed authoritative candidate, in
//! derived-input order, or with [`MatchStrategy::Optimal`] solves the
//! assignment per weekday. [`strict::compare_strict`] is the field-by-field
//! alternative that reports which fields differ.

pub mod strict;
pub mod summary;

use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};
use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;
use serde::{Deserialize, Serialize};

use crate::cleanup::fold_key;
use crate::model::{AuthoritativeSchedule, ComparisonResult, Field, ScheduleEntry, Weekday};
use crate::time::{time_key, to_minutes};

pub use strict::{compare_entries, compare_strict};
pub use summary::{summarize, ReconSummary};

/// How derived entries claim authoritative candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Each derived entry, in input order, takes its best unclaimed
    /// candidate. An early entry can take a candidate a later one needed.
    #[default]
    Greedy,
    /// Minimum-cost bipartite assignment per weekday.
    Optimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    pub time_tolerance_minutes: u32,
    pub require_same_location: bool,
    pub trainer_fuzzy: bool,
    pub strategy: MatchStrategy,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            time_tolerance_minutes: 5,
            require_same_location: false,
            trainer_fuzzy: true,
            strategy: MatchStrategy::Greedy,
        }
    }
}

const TRAINER_EXACT_BONUS: f64 = 0.1;
const CLASS_EXACT_BONUS: f64 = 0.05;
const LOCATION_EXACT_BONUS: f64 = 0.02;

/// Lower-cased class name with a leading "studio " removed.
pub fn class_core(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_prefix("studio ") {
        Some(rest) => rest.trim().to_string(),
        None => lower,
    }
}

/// Class names are equivalent when equal after dropping case and the
/// "Studio " prefix.
pub fn classes_equivalent(a: &str, b: &str) -> bool {
    class_core(a) == class_core(b)
}

/// Case-insensitive trainer equality, optionally relaxed to containment
/// either way or an equal four-character prefix.
pub fn trainers_compatible(a: &str, b: &str, fuzzy: bool) -> bool {
    let (a, b) = (fold_key(a), fold_key(b));
    if a == b {
        return true;
    }
    if !fuzzy || a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(&b) || b.contains(&a) {
        return true;
    }
    let prefix = |s: &str| s.chars().take(4).collect::<String>();
    prefix(&a) == prefix(&b)
}

/// Fields whose literal values differ between two entries.
pub fn literal_differences(a: &ScheduleEntry, d: &ScheduleEntry) -> BTreeSet<Field> {
    let mut fields = BTreeSet::new();
    if a.day != d.day {
        fields.insert(Field::Day);
    }
    if time_key(&a.time) != time_key(&d.time) {
        fields.insert(Field::Time);
    }
    if a.class_name != d.class_name {
        fields.insert(Field::ClassName);
    }
    if a.trainer != d.trainer {
        fields.insert(Field::Trainer);
    }
    if a.location != d.location {
        fields.insert(Field::Location);
    }
    fields
}

fn candidate_score(
    derived: &ScheduleEntry,
    derived_minutes: u32,
    candidate: &ScheduleEntry,
    options: &ReconcileOptions,
) -> Option<f64> {
    let minutes = to_minutes(&candidate.time)?;
    let diff = minutes.abs_diff(derived_minutes);
    if diff > options.time_tolerance_minutes {
        return None;
    }
    if options.require_same_location
        && !candidate.location.trim().eq_ignore_ascii_case(derived.location.trim())
    {
        return None;
    }
    if !classes_equivalent(&candidate.class_name, &derived.class_name) {
        return None;
    }
    if !trainers_compatible(&candidate.trainer, &derived.trainer, options.trainer_fuzzy) {
        return None;
    }

    let mut score = if options.time_tolerance_minutes == 0 {
        0.0
    } else {
        f64::from(diff) / f64::from(options.time_tolerance_minutes)
    };
    if candidate.trainer == derived.trainer {
        score -= TRAINER_EXACT_BONUS;
    }
    if candidate.class_name == derived.class_name {
        score -= CLASS_EXACT_BONUS;
    }
    if candidate.location == derived.location {
        score -= LOCATION_EXACT_BONUS;
    }
    Some(score)
}

/// Per derived entry, the index of the claimed candidate within its day.
fn assign_greedy(
    derived: &[ScheduleEntry],
    authoritative: &AuthoritativeSchedule,
    options: &ReconcileOptions,
) -> Vec<Option<usize>> {
    let mut claimed: HashMap<Weekday, Vec<bool>> = authoritative
        .iter()
        .map(|(day, entries)| (*day, vec![false; entries.len()]))
        .collect();

    derived
        .iter()
        .map(|entry| {
            let candidates = authoritative.get(&entry.day)?;
            let minutes = to_minutes(&entry.time)?;
            let used = claimed.get_mut(&entry.day)?;

            let mut best: Option<(usize, f64)> = None;
            for (idx, candidate) in candidates.iter().enumerate() {
                if used[idx] {
                    continue;
                }
                let Some(score) = candidate_score(entry, minutes, candidate, options) else {
                    continue;
                };
                if best.map_or(true, |(_, s)| score < s) {
                    best = Some((idx, score));
                }
            }

            let (idx, _) = best?;
            used[idx] = true;
            Some(idx)
        })
        .collect()
}

const NO_EDGE: i64 = 1_000_000_000;

/// Minimum-cost assignment per weekday: the largest possible number of
/// matches, then the lowest total score among those.
fn assign_optimal(
    derived: &[ScheduleEntry],
    authoritative: &AuthoritativeSchedule,
    options: &ReconcileOptions,
) -> Vec<Option<usize>> {
    let mut assignment = vec![None; derived.len()];

    for (day, candidates) in authoritative {
        let rows: Vec<(usize, u32)> = derived
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.day == *day)
            .filter_map(|(idx, entry)| to_minutes(&entry.time).map(|m| (idx, m)))
            .collect();
        if rows.is_empty() || candidates.is_empty() {
            continue;
        }

        // Square matrix; padding rows cost nothing, padding columns and
        // impossible pairs cost NO_EDGE.
        let size = rows.len().max(candidates.len());
        let costs: Vec<Vec<i64>> = (0..size)
            .map(|r| {
                (0..size)
                    .map(|c| match (rows.get(r), candidates.get(c)) {
                        (Some((d_idx, minutes)), Some(candidate)) => {
                            candidate_score(&derived[*d_idx], *minutes, candidate, options)
                                .map(|score| ((score + 1.0) * 1000.0).round() as i64)
                                .unwrap_or(NO_EDGE)
                        }
                        (Some(_), None) => NO_EDGE,
                        (None, _) => 0,
                    })
                    .collect()
            })
            .collect();

        let Ok(weights) = Matrix::from_rows(costs.clone()) else {
            continue;
        };
        let (_, columns) = kuhn_munkres_min(&weights);

        for (r, c) in columns.into_iter().enumerate() {
            if r < rows.len() && c < candidates.len() && costs[r][c] < NO_EDGE {
                assignment[rows[r].0] = Some(c);
            }
        }
    }

    assignment
}

/// Tolerant reconciliation.
///
/// Every derived entry appears in exactly one result, in input order. Each
/// authoritative entry is claimed at most once. Unclaimed authoritative
/// entries follow, by weekday and then source order. Matched results carry
/// the literally differing fields as information; they do not affect the
/// match.
pub fn reconcile(
    derived: &[ScheduleEntry],
    authoritative: &AuthoritativeSchedule,
    options: &ReconcileOptions,
) -> Vec<ComparisonResult> {
    let assignment = match options.strategy {
        MatchStrategy::Greedy => assign_greedy(derived, authoritative, options),
        MatchStrategy::Optimal => assign_optimal(derived, authoritative, options),
    };

    let mut claimed: HashMap<Weekday, Vec<bool>> = authoritative
        .iter()
        .map(|(day, entries)| (*day, vec![false; entries.len()]))
        .collect();
    let mut results = Vec::with_capacity(derived.len());

    for (entry, pick) in derived.iter().zip(assignment) {
        let matched = pick.and_then(|idx| {
            let candidate = authoritative.get(&entry.day)?.get(idx)?;
            Some((idx, candidate))
        });
        match matched {
            Some((idx, candidate)) => {
                if let Some(used) = claimed.get_mut(&entry.day) {
                    used[idx] = true;
                }
                trace!("{}: matched {} -> {}", entry.day, entry.identity_key, candidate.identity_key);
                results.push(ComparisonResult {
                    authoritative: Some(candidate.clone()),
                    derived: Some(entry.clone()),
                    is_match: true,
                    mismatch_reason: String::new(),
                    discrepancy_fields: literal_differences(candidate, entry),
                });
            }
            None => results.push(ComparisonResult::derived_only(entry.clone())),
        }
    }

    for (day, entries) in authoritative {
        let used = &claimed[day];
        for (idx, entry) in entries.iter().enumerate() {
            if !used[idx] {
                results.push(ComparisonResult::authoritative_only(entry.clone()));
            }
        }
    }

    debug!(
        "reconciled {} derived against {} authoritative entries ({:?})",
        derived.len(),
        authoritative.values().map(Vec::len).sum::<usize>(),
        options.strategy
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::group_by_day;

    fn entry(day: Weekday, time: &str, class: &str, trainer: &str) -> ScheduleEntry {
        ScheduleEntry::new(day, time, class, trainer, "Supreme HQ, Bandra")
    }

    #[test]
    fn test_exact_match() {
        let auth = group_by_day(&[entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")]);
        let derived = vec![entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")];
        let results = reconcile(&derived, &auth, &ReconcileOptions::default());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_match);
        assert!(results[0].discrepancy_fields.is_empty());
    }

    #[test]
    fn test_within_tolerance_and_studio_prefix() {
        let auth = group_by_day(&[entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")]);
        let derived = vec![entry(Weekday::Monday, "7:18 AM", "barre 57", "Anisha")];
        let results = reconcile(&derived, &auth, &ReconcileOptions::default());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_match);
        assert!(results[0].discrepancy_fields.contains(&Field::Time));
        assert!(results[0].discrepancy_fields.contains(&Field::Trainer));
    }

    #[test]
    fn test_outside_tolerance() {
        let auth = group_by_day(&[entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")]);
        let derived = vec![entry(Weekday::Monday, "7:30 AM", "Studio Barre 57", "Anisha Shah")];
        let results = reconcile(&derived, &auth, &ReconcileOptions::default());
        assert_eq!(results.len(), 2);
        assert!(!results[0].is_match);
        assert_eq!(results[0].mismatch_reason, "no matching authoritative entry found");
        assert!(results[1].derived.is_none());
        assert_eq!(results[1].mismatch_reason, "no matching derived entry found");
    }

    #[test]
    fn test_authoritative_claimed_once() {
        let auth = group_by_day(&[entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")]);
        let derived = vec![
            entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah"),
            entry(Weekday::Monday, "7:16 AM", "Studio Barre 57", "Anisha Shah"),
        ];
        let results = reconcile(&derived, &auth, &ReconcileOptions::default());
        assert_eq!(results.len(), 2);
        assert!(results[0].is_match);
        assert!(!results[1].is_match);
    }

    #[test]
    fn test_best_candidate_preferred() {
        let auth = group_by_day(&[
            entry(Weekday::Monday, "7:19 AM", "Studio Barre 57", "Anisha Shah"),
            entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah"),
        ]);
        let derived = vec![entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")];
        let results = reconcile(&derived, &auth, &ReconcileOptions::default());
        assert_eq!(results[0].authoritative.as_ref().unwrap().time, "7:15 AM");
    }

    #[test]
    fn test_zero_tolerance_ties_go_to_first_candidate() {
        let options = ReconcileOptions {
            time_tolerance_minutes: 0,
            ..ReconcileOptions::default()
        };
        let first = ScheduleEntry::new(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah", "Kenkere House");
        let second = ScheduleEntry::new(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah", "Copper + Cloves");
        let auth = group_by_day(&[first, second]);
        let derived = vec![entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")];
        let results = reconcile(&derived, &auth, &options);
        assert_eq!(
            results[0].authoritative.as_ref().unwrap().location,
            "Kenkere House"
        );
    }

    #[test]
    fn test_trainer_fuzzy_toggle() {
        let auth = group_by_day(&[entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Pranjali Jain")]);
        let derived = vec![entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Pranj")];
        assert!(reconcile(&derived, &auth, &ReconcileOptions::default())[0].is_match);

        let strict = ReconcileOptions {
            trainer_fuzzy: false,
            ..ReconcileOptions::default()
        };
        assert!(!reconcile(&derived, &auth, &strict)[0].is_match);
    }

    #[test]
    fn test_require_same_location() {
        let auth = group_by_day(&[ScheduleEntry::new(
            Weekday::Monday,
            "7:15 AM",
            "Studio FIT",
            "Anisha Shah",
            "Kenkere House",
        )]);
        let derived = vec![entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Anisha Shah")];
        assert!(reconcile(&derived, &auth, &ReconcileOptions::default())[0].is_match);

        let options = ReconcileOptions {
            require_same_location: true,
            ..ReconcileOptions::default()
        };
        assert!(!reconcile(&derived, &auth, &options)[0].is_match);
    }

    #[test]
    fn test_other_day_never_matches() {
        let auth = group_by_day(&[entry(Weekday::Tuesday, "7:15 AM", "Studio FIT", "Anisha Shah")]);
        let derived = vec![entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Anisha Shah")];
        let results = reconcile(&derived, &auth, &ReconcileOptions::default());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_match));
    }

    fn stealing_case() -> (Vec<ScheduleEntry>, AuthoritativeSchedule) {
        // The first derived entry prefers the only candidate the second can use.
        let auth = group_by_day(&[
            entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Anisha Shah"),
            entry(Weekday::Monday, "7:19 AM", "Studio FIT", "Anisha Shah"),
        ]);
        let derived = vec![
            entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Anisha Shah"),
            entry(Weekday::Monday, "7:12 AM", "Studio FIT", "Anisha Shah"),
        ];
        (derived, auth)
    }

    #[test]
    fn test_greedy_can_steal() {
        let (derived, auth) = stealing_case();
        let results = reconcile(&derived, &auth, &ReconcileOptions::default());
        assert_eq!(summarize(&results).matched, 1);
    }

    #[test]
    fn test_optimal_maximizes_matches() {
        let (derived, auth) = stealing_case();
        let options = ReconcileOptions {
            strategy: MatchStrategy::Optimal,
            ..ReconcileOptions::default()
        };
        let results = reconcile(&derived, &auth, &options);
        assert_eq!(summarize(&results).matched, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].authoritative.as_ref().unwrap().time, "7:19 AM");
        assert_eq!(results[1].authoritative.as_ref().unwrap().time, "7:15 AM");
    }

    #[test]
    fn test_greedy_fuzzy_trainers_can_lose_matches() {
        // A looser trainer rule lets the first entry claim the candidate the
        // second one needed. Only the optimal strategy keeps the count.
        let auth = group_by_day(&[
            entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Anisha"),
            entry(Weekday::Monday, "7:18 AM", "Studio FIT", "Anisha Shah"),
        ]);
        let derived = vec![
            entry(Weekday::Monday, "7:15 AM", "Studio FIT", "Anisha Shah"),
            entry(Weekday::Monday, "7:11 AM", "Studio FIT", "Anisha"),
        ];
        let matched = |trainer_fuzzy: bool, strategy: MatchStrategy| {
            let options = ReconcileOptions {
                trainer_fuzzy,
                strategy,
                ..ReconcileOptions::default()
            };
            summarize(&reconcile(&derived, &auth, &options)).matched
        };

        assert_eq!(matched(true, MatchStrategy::Greedy), 1);
        assert_eq!(matched(false, MatchStrategy::Greedy), 2);
        assert_eq!(matched(true, MatchStrategy::Optimal), 2);
    }

    #[test]
    fn test_optimal_prefers_lower_score() {
        let auth = group_by_day(&[
            entry(Weekday::Monday, "7:19 AM", "Studio Barre 57", "Anisha Shah"),
            entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah"),
        ]);
        let derived = vec![entry(Weekday::Monday, "7:15 AM", "Studio Barre 57", "Anisha Shah")];
        let options = ReconcileOptions {
            strategy: MatchStrategy::Optimal,
            ..ReconcileOptions::default()
        };
        let results = reconcile(&derived, &auth, &options);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].authoritative.as_ref().unwrap().time, "7:15 AM");
    }

    #[test]
    fn test_trainers_compatible() {
        assert!(trainers_compatible("Anisha Shah", "anisha shah", false));
        assert!(!trainers_compatible("Anisha Shah", "Anisha", false));
        assert!(trainers_compatible("Anisha Shah", "Anisha", true));
        assert!(trainers_compatible("Richard D'Costa", "Richie", true));
        assert!(!trainers_compatible("Anisha", "", true));
        assert!(!trainers_compatible("Anisha", "Richard", true));
    }
}
