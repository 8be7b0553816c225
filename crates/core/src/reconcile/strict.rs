//! Field-by-field comparison.

use std::collections::{BTreeSet, HashMap};

use crate::cleanup::fold_key;
use crate::model::{AuthoritativeSchedule, ComparisonResult, Field, ScheduleEntry, Weekday};
use crate::time::time_key;

use super::classes_equivalent;

/// Compare two entries field by field.
///
/// Day and time must be equal (times compared on their 24-hour key), class
/// names equivalent, trainers equal ignoring case and punctuation. The
/// reason lists the differing fields, e.g. `mismatched fields: time, trainer`.
pub fn compare_entries(authoritative: &ScheduleEntry, derived: &ScheduleEntry) -> ComparisonResult {
    let mut fields = BTreeSet::new();
    if authoritative.day != derived.day {
        fields.insert(Field::Day);
    }
    if time_key(&authoritative.time) != time_key(&derived.time) {
        fields.insert(Field::Time);
    }
    if !classes_equivalent(&authoritative.class_name, &derived.class_name) {
        fields.insert(Field::ClassName);
    }
    if fold_key(&authoritative.trainer) != fold_key(&derived.trainer) {
        fields.insert(Field::Trainer);
    }

    let mismatch_reason = if fields.is_empty() {
        String::new()
    } else {
        let names: Vec<String> = fields.iter().map(Field::to_string).collect();
        format!("mismatched fields: {}", names.join(", "))
    };

    ComparisonResult {
        authoritative: Some(authoritative.clone()),
        derived: Some(derived.clone()),
        is_match: fields.is_empty(),
        mismatch_reason,
        discrepancy_fields: fields,
    }
}

/// Strict reconciliation.
///
/// Each derived entry is paired with the first unclaimed authoritative entry
/// of the same weekday sharing both time and class, failing that the first
/// sharing either one. Pairs are then compared with [`compare_entries`].
/// Unpaired entries on either side become one-sided results.
pub fn compare_strict(
    derived: &[ScheduleEntry],
    authoritative: &AuthoritativeSchedule,
) -> Vec<ComparisonResult> {
    let mut claimed: HashMap<Weekday, Vec<bool>> = authoritative
        .iter()
        .map(|(day, entries)| (*day, vec![false; entries.len()]))
        .collect();
    let mut results = Vec::with_capacity(derived.len());

    for entry in derived {
        let Some(candidates) = authoritative.get(&entry.day) else {
            results.push(ComparisonResult::derived_only(entry.clone()));
            continue;
        };
        let used = &claimed[&entry.day];
        let key = time_key(&entry.time);
        let same_time = |c: &ScheduleEntry| time_key(&c.time) == key;
        let same_class = |c: &ScheduleEntry| classes_equivalent(&c.class_name, &entry.class_name);

        let open = move || {
            candidates
                .iter()
                .enumerate()
                .filter(move |(idx, _)| !used[*idx])
        };
        let pick = open()
            .find(|(_, c)| same_time(*c) && same_class(*c))
            .or_else(|| open().find(|(_, c)| same_time(*c) || same_class(*c)))
            .map(|(idx, _)| idx);

        match pick {
            Some(idx) => {
                if let Some(used) = claimed.get_mut(&entry.day) {
                    used[idx] = true;
                }
                results.push(compare_entries(&candidates[idx], entry));
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

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::group_by_day;

    fn entry(day: Weekday, time: &str, class: &str, trainer: &str) -> ScheduleEntry {
        ScheduleEntry::new(day, time, class, trainer, "Kenkere House")
    }

    #[test]
    fn test_compare_entries_match() {
        let a = entry(Weekday::Friday, "6:00 PM", "Studio Mat 57", "Anisha Shah");
        let d = entry(Weekday::Friday, "18:00", "mat 57", "ANISHA SHAH");
        let result = compare_entries(&a, &d);
        assert!(result.is_match);
        assert_eq!(result.mismatch_reason, "");
    }

    #[test]
    fn test_compare_entries_reason_lists_fields() {
        let a = entry(Weekday::Friday, "6:00 PM", "Studio Mat 57", "Anisha Shah");
        let d = entry(Weekday::Friday, "6:30 PM", "Studio Mat 57", "Richard D'Costa");
        let result = compare_entries(&a, &d);
        assert!(!result.is_match);
        assert_eq!(result.mismatch_reason, "mismatched fields: time, trainer");
        assert_eq!(
            result.discrepancy_fields.into_iter().collect::<Vec<_>>(),
            vec![Field::Time, Field::Trainer]
        );
    }

    #[test]
    fn test_compare_strict_pairs_by_time_or_class() {
        let auth = group_by_day(&[
            entry(Weekday::Friday, "6:00 PM", "Studio Mat 57", "Anisha Shah"),
            entry(Weekday::Friday, "7:00 PM", "Studio FIT", "Richard D'Costa"),
        ]);
        let derived = vec![
            entry(Weekday::Friday, "7:00 PM", "Studio FIT", "Richard D'Costa"),
            entry(Weekday::Friday, "6:15 PM", "Studio Mat 57", "Anisha Shah"),
            entry(Weekday::Friday, "9:00 PM", "Studio HIIT", "Anisha Shah"),
        ];
        let results = compare_strict(&derived, &auth);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_match);
        assert!(!results[1].is_match);
        assert_eq!(results[1].mismatch_reason, "mismatched fields: time");
        assert!(results[2].authoritative.is_none());
    }
}
