//! Name normalization against a fixed vocabulary.
//!
//! Lookups are an exact match on the folded key of any alias first, then the
//! closest fuzzy key under the threshold, then the raw text unchanged. The
//! indexes are built once per [`Normalizer`]; [`Normalizer::builtin`] hands
//! out a process-wide instance over the compiled-in vocabulary.

pub mod builtin;
pub mod fuzzy;
pub mod vocabulary;

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::cleanup::fold_key;

pub use fuzzy::{edit_distance, normalized_distance, FuzzyIndex};
pub use vocabulary::{
    Vocabulary, VocabularyEntry, VocabularyIndex, VocabularyKind, DEFAULT_FUZZY_THRESHOLD,
};

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]{0,2}\d+[a-z]?$").unwrap())
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    classes: VocabularyIndex,
    trainers: VocabularyIndex,
    locations: VocabularyIndex,
    class_denylist: HashSet<String>,
}

impl Normalizer {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let threshold = vocabulary.fuzzy_threshold;
        Self {
            classes: VocabularyIndex::new(VocabularyKind::Class, &vocabulary.classes, threshold),
            trainers: VocabularyIndex::new(VocabularyKind::Trainer, &vocabulary.trainers, threshold),
            locations: VocabularyIndex::new(VocabularyKind::Location, &vocabulary.locations, threshold),
            class_denylist: vocabulary
                .class_denylist
                .iter()
                .map(|s| fold_key(s))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Shared normalizer over [`Vocabulary::builtin`].
    pub fn builtin() -> &'static Normalizer {
        static NORMALIZER: OnceLock<Normalizer> = OnceLock::new();
        NORMALIZER.get_or_init(|| Normalizer::new(&Vocabulary::builtin()))
    }

    pub fn classes(&self) -> &VocabularyIndex {
        &self.classes
    }

    pub fn trainers(&self) -> &VocabularyIndex {
        &self.trainers
    }

    pub fn locations(&self) -> &VocabularyIndex {
        &self.locations
    }

    pub fn normalize_class(&self, raw: &str) -> String {
        resolve(&self.classes, raw)
    }

    pub fn normalize_trainer(&self, raw: &str) -> String {
        resolve(&self.trainers, raw)
    }

    pub fn normalize_location(&self, raw: &str) -> String {
        resolve(&self.locations, raw)
    }

    /// Whether an extracted class name can stand as a class.
    ///
    /// Known spellings of a class always pass. Anything else is rejected when it is on
    /// the denylist, is really a trainer name, is a bare number or code such
    /// as `57` or `b12`, or is a single token of two characters or fewer.
    pub fn is_valid_class_name(&self, name: &str) -> bool {
        if self.classes.lookup_exact(name).is_some() {
            return true;
        }

        let key = fold_key(name);
        if key.is_empty() || self.class_denylist.contains(&key) {
            return false;
        }
        if self.trainers.lookup_exact(&key).is_some() {
            return false;
        }
        if key.split(' ').all(|token| code_regex().is_match(token)) {
            return false;
        }
        !(!key.contains(' ') && key.chars().count() <= 2)
    }

    /// Find a studio location named anywhere in free text, preferring the
    /// longest matching key.
    pub fn detect_location(&self, text: &str) -> Option<String> {
        let mut best: Option<(usize, &str)> = None;
        for line in text.lines() {
            let folded = format!(" {} ", fold_key(line));
            if folded.trim().is_empty() {
                continue;
            }
            for (key, canonical) in self.locations.keys() {
                if key.len() < 4 || !folded.contains(&format!(" {key} ")) {
                    continue;
                }
                if best.map_or(true, |(len, _)| key.len() > len) {
                    best = Some((key.len(), canonical));
                }
            }
        }
        best.map(|(_, canonical)| canonical.to_string())
    }
}

fn resolve(index: &VocabularyIndex, raw: &str) -> String {
    match index.lookup(raw) {
        Some(canonical) => canonical.to_string(),
        None => raw.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}
