//! Per-day side-by-side alignment of authoritative and derived entries.
//!
//! Rows pair entries that share a weekday and time key and whose class names
//! overlap; each row is then classified. The result is a display model, the
//! matching rules are looser than [`crate::reconcile`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cleanup::fold_key;
use crate::model::{AuthoritativeSchedule, ScheduleEntry, Weekday};
use crate::reconcile::class_core;
use crate::time::{time_key, to_minutes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentKind {
    Match,
    TimeMismatch,
    ClassMismatch,
    TrainerMismatch,
    AuthoritativeOnly,
    DerivedOnly,
}

impl AlignmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::TimeMismatch => "time mismatch",
            Self::ClassMismatch => "class mismatch",
            Self::TrainerMismatch => "trainer mismatch",
            Self::AuthoritativeOnly => "authoritative only",
            Self::DerivedOnly => "derived only",
        }
    }
}

impl std::fmt::Display for AlignmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedRow {
    pub time_key: String,
    pub kind: AlignmentKind,
    pub authoritative: Option<ScheduleEntry>,
    pub derived: Option<ScheduleEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignOptions {
    /// When non-zero, entries left over after exact time-key pairing are
    /// paired again if their times are this close; such rows are reported
    /// as time mismatches.
    pub time_window_minutes: u32,
}

pub type Alignment = BTreeMap<Weekday, Vec<AlignedRow>>;

fn classes_related(a: &str, b: &str) -> bool {
    let (a, b) = (class_core(a), class_core(b));
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// Classify a pair: time first, then class, then trainer.
pub fn classify(authoritative: &ScheduleEntry, derived: &ScheduleEntry) -> AlignmentKind {
    if time_key(&authoritative.time) != time_key(&derived.time) {
        AlignmentKind::TimeMismatch
    } else if class_core(&authoritative.class_name) != class_core(&derived.class_name) {
        AlignmentKind::ClassMismatch
    } else if fold_key(&authoritative.trainer) != fold_key(&derived.trainer) {
        AlignmentKind::TrainerMismatch
    } else {
        AlignmentKind::Match
    }
}

fn align_day(
    authoritative: &[ScheduleEntry],
    derived: &[ScheduleEntry],
    options: &AlignOptions,
) -> Vec<AlignedRow> {
    let mut derived_used = vec![false; derived.len()];
    let mut pairs: Vec<Option<usize>> = vec![None; authoritative.len()];

    for (a_idx, a) in authoritative.iter().enumerate() {
        let key = time_key(&a.time);
        let found = derived.iter().enumerate().position(|(d_idx, d)| {
            !derived_used[d_idx] && time_key(&d.time) == key && classes_related(&a.class_name, &d.class_name)
        });
        if let Some(d_idx) = found {
            derived_used[d_idx] = true;
            pairs[a_idx] = Some(d_idx);
        }
    }

    if options.time_window_minutes > 0 {
        for (a_idx, a) in authoritative.iter().enumerate() {
            if pairs[a_idx].is_some() {
                continue;
            }
            let Some(a_minutes) = to_minutes(&a.time) else {
                continue;
            };
            let found = derived.iter().enumerate().position(|(d_idx, d)| {
                !derived_used[d_idx]
                    && classes_related(&a.class_name, &d.class_name)
                    && to_minutes(&d.time)
                        .is_some_and(|m| m.abs_diff(a_minutes) <= options.time_window_minutes)
            });
            if let Some(d_idx) = found {
                derived_used[d_idx] = true;
                pairs[a_idx] = Some(d_idx);
            }
        }
    }

    let mut rows: Vec<AlignedRow> = authoritative
        .iter()
        .zip(&pairs)
        .map(|(a, pair)| match pair {
            Some(d_idx) => AlignedRow {
                time_key: time_key(&a.time),
                kind: classify(a, &derived[*d_idx]),
                authoritative: Some(a.clone()),
                derived: Some(derived[*d_idx].clone()),
            },
            None => AlignedRow {
                time_key: time_key(&a.time),
                kind: AlignmentKind::AuthoritativeOnly,
                authoritative: Some(a.clone()),
                derived: None,
            },
        })
        .collect();

    rows.extend(
        derived
            .iter()
            .zip(&derived_used)
            .filter(|(_, used)| !**used)
            .map(|(d, _)| AlignedRow {
                time_key: time_key(&d.time),
                kind: AlignmentKind::DerivedOnly,
                authoritative: None,
                derived: Some(d.clone()),
            }),
    );

    rows.sort_by(|x, y| x.time_key.cmp(&y.time_key));
    rows
}

/// Build the alignment for every weekday present on either side.
pub fn build_alignment(
    derived: &BTreeMap<Weekday, Vec<ScheduleEntry>>,
    authoritative: &AuthoritativeSchedule,
    options: &AlignOptions,
) -> Alignment {
    let days: std::collections::BTreeSet<Weekday> =
        derived.keys().chain(authoritative.keys()).copied().collect();

    days.into_iter()
        .map(|day| {
            let a = authoritative.get(&day).map(Vec::as_slice).unwrap_or_default();
            let d = derived.get(&day).map(Vec::as_slice).unwrap_or_default();
            (day, align_day(a, d, options))
        })
        .collect()
}
