use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

use super::builtin;
use super::fuzzy::FuzzyIndex;
use crate::cleanup::fold_key;
use crate::error::ScheduleError;

/// One canonical name and the spellings that map to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl VocabularyEntry {
    pub fn new(canonical: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            canonical: canonical.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Canonical classes, trainers and locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub classes: Vec<VocabularyEntry>,
    pub trainers: Vec<VocabularyEntry>,
    pub locations: Vec<VocabularyEntry>,
    pub class_denylist: Vec<String>,
    /// Normalised edit distance strictly below which a fuzzy hit is accepted.
    pub fuzzy_threshold: f64,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            trainers: Vec::new(),
            locations: Vec::new(),
            class_denylist: Vec::new(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.4;

fn from_table(table: &[(&str, &[&str])]) -> Vec<VocabularyEntry> {
    table
        .iter()
        .map(|(canonical, aliases)| VocabularyEntry::new(*canonical, aliases))
        .collect()
}

impl Vocabulary {
    /// The vocabulary compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            classes: from_table(builtin::CLASSES),
            trainers: from_table(builtin::TRAINERS),
            locations: from_table(builtin::LOCATIONS),
            class_denylist: builtin::CLASS_DENYLIST.iter().map(|s| s.to_string()).collect(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    /// Check that canonical names are present, that no alias points at two
    /// different canonical names, and that the fuzzy threshold is usable.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(ScheduleError::ConfigValidation(format!(
                "fuzzy_threshold must be in (0, 1], got {}",
                self.fuzzy_threshold
            )));
        }

        for (kind, entries) in [
            (VocabularyKind::Class, &self.classes),
            (VocabularyKind::Trainer, &self.trainers),
            (VocabularyKind::Location, &self.locations),
        ] {
            let mut owners: HashMap<String, &str> = HashMap::new();
            for entry in entries {
                if fold_key(&entry.canonical).is_empty() {
                    return Err(ScheduleError::ConfigValidation(format!(
                        "{kind} entry with empty canonical name"
                    )));
                }
                let keys = std::iter::once(&entry.canonical).chain(entry.aliases.iter());
                for key in keys.map(|k| fold_key(k)).filter(|k| !k.is_empty()) {
                    match owners.get(&key) {
                        Some(owner) if *owner != entry.canonical => {
                            return Err(ScheduleError::ConfigValidation(format!(
                                "{kind} alias '{key}' maps to both '{owner}' and '{}'",
                                entry.canonical
                            )));
                        }
                        _ => {
                            owners.insert(key, &entry.canonical);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyKind {
    Class,
    Trainer,
    Location,
}

impl std::fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            VocabularyKind::Class => "class",
            VocabularyKind::Trainer => "trainer",
            VocabularyKind::Location => "location",
        })
    }
}

/// Lookup structure for one vocabulary kind, built once.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    kind: VocabularyKind,
    canonical: Vec<String>,
    exact: HashMap<String, usize>,
    fuzzy: FuzzyIndex,
    threshold: f64,
}

impl VocabularyIndex {
    pub fn new(kind: VocabularyKind, entries: &[VocabularyEntry], threshold: f64) -> Self {
        let canonical: Vec<String> = entries.iter().map(|e| e.canonical.clone()).collect();
        let mut exact: HashMap<String, usize> = HashMap::new();

        // Explicit spellings first so derived keys never shadow them.
        for (idx, entry) in entries.iter().enumerate() {
            for key in std::iter::once(&entry.canonical).chain(entry.aliases.iter()) {
                let key = fold_key(key);
                if !key.is_empty() {
                    exact.entry(key).or_insert(idx);
                }
            }
        }

        for (key, idx) in derived_keys(kind, entries) {
            exact.entry(key).or_insert(idx);
        }

        let fuzzy = FuzzyIndex::new(exact.iter().map(|(k, v)| (k.clone(), *v)));

        Self {
            kind,
            canonical,
            exact,
            fuzzy,
            threshold,
        }
    }

    pub fn kind(&self) -> VocabularyKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn canonical_names(&self) -> &[String] {
        &self.canonical
    }

    /// Whether `name` is exactly one of the canonical names.
    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonical.iter().any(|c| c == name)
    }

    /// Exact lookup on the folded form of `raw`.
    pub fn lookup_exact(&self, raw: &str) -> Option<&str> {
        let idx = self.exact.get(&fold_key(raw))?;
        Some(&self.canonical[*idx])
    }

    /// Exact lookup, then the closest key under the fuzzy threshold.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        let key = fold_key(raw);
        if key.is_empty() {
            return None;
        }
        if let Some(idx) = self.exact.get(&key) {
            return Some(&self.canonical[*idx]);
        }
        let (idx, distance) = self.fuzzy.closest(&key, self.threshold)?;
        trace!("{} fuzzy: {raw:?} -> {:?} ({distance:.2})", self.kind, self.canonical[idx]);
        Some(&self.canonical[idx])
    }

    /// Iterate over every folded key and the canonical name it resolves to.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exact
            .iter()
            .map(|(k, idx)| (k.as_str(), self.canonical[*idx].as_str()))
    }
}

/// Keys implied by the canonical names themselves.
///
/// Classes are also known without their "Studio " prefix.  Trainers are also
/// known by first name when no other trainer shares it.  Locations are known
/// by each comma-separated part.
fn derived_keys(kind: VocabularyKind, entries: &[VocabularyEntry]) -> Vec<(String, usize)> {
    match kind {
        VocabularyKind::Class => entries
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| {
                let key = fold_key(&e.canonical);
                key.strip_prefix("studio ").map(|rest| (rest.to_string(), idx))
            })
            .collect(),
        VocabularyKind::Trainer => {
            let firsts: Vec<Option<String>> = entries
                .iter()
                .map(|e| fold_key(&e.canonical).split(' ').next().map(str::to_string))
                .collect();
            firsts
                .iter()
                .enumerate()
                .filter_map(|(idx, first)| {
                    let first = first.as_ref()?;
                    let unique = firsts.iter().filter(|f| f.as_ref() == Some(first)).count() == 1;
                    (unique && first.len() >= 3).then(|| (first.clone(), idx))
                })
                .collect()
        }
        VocabularyKind::Location => entries
            .iter()
            .enumerate()
            .flat_map(|(idx, e)| {
                e.canonical
                    .split(',')
                    .map(fold_key)
                    .filter(|k| !k.is_empty())
                    .map(move |k| (k, idx))
                    .collect::<Vec<_>>()
            })
            .collect(),
    }
}
