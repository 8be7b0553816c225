//! Turning raw entries into normalized, de-duplicated schedule entries.

use std::collections::HashSet;

use log::trace;

use crate::model::{RawEntry, ScheduleEntry, Weekday};
use crate::normalize::Normalizer;

/// Identity keys already emitted by one parse invocation.
///
/// Callers own the accumulator, so two parses of different documents never
/// share state.
#[derive(Debug, Clone, Default)]
pub struct SeenKeys {
    keys: HashSet<String>,
}

impl SeenKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Record a key; `false` if it was already present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A raw entry together with the context it was found in.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub day: Weekday,
    pub entry: RawEntry,
    pub location: String,
}

/// Normalize, validate and de-duplicate candidates in order.
///
/// Candidates whose extracted class name is not a plausible class are
/// dropped, as is any entry whose identity key is already in `seen`.
pub fn assemble(
    candidates: impl IntoIterator<Item = Candidate>,
    normalizer: &Normalizer,
    seen: &mut SeenKeys,
) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();

    for Candidate {
        day,
        entry,
        location,
    } in candidates
    {
        if !normalizer.is_valid_class_name(&entry.class_name) {
            trace!("{day}: rejected class {:?}", entry.class_name);
            continue;
        }
        let class_name = normalizer.normalize_class(&entry.class_name);
        let trainer = normalizer.normalize_trainer(&entry.trainer_name);
        let location = if location.trim().is_empty() {
            String::new()
        } else {
            normalizer.normalize_location(&location)
        };

        let assembled = ScheduleEntry::new(day, entry.time, class_name, trainer, location)
            .with_theme(entry.theme);
        if !seen.insert(assembled.identity_key.clone()) {
            trace!("{day}: duplicate {}", assembled.identity_key);
            continue;
        }
        entries.push(assembled);
    }

    entries
}
