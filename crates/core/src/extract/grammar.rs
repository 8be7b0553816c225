//! Named line grammars.
//!
//! Each grammar is a pure function from one entry segment to a [`RawEntry`].
//! They are tried in order and the first one that produces an entry wins.

use std::sync::OnceLock;

use regex::Regex;

use super::clean::{clean_class_name, clean_trainer_name, is_valid_trainer};
use super::ExtractConfig;
use crate::model::RawEntry;
use crate::time::{parse_time, TIME_TOKEN};

/// A named segment parser.
#[derive(Clone, Copy)]
pub struct LineGrammar {
    pub name: &'static str,
    pub parse: fn(&str, &ExtractConfig) -> Option<RawEntry>,
}

impl std::fmt::Debug for LineGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineGrammar").field("name", &self.name).finish()
    }
}

/// Grammars in the order they are attempted.
pub const GRAMMARS: &[LineGrammar] = &[
    LineGrammar {
        name: "hyphenated-trainer",
        parse: hyphenated_trainer,
    },
    LineGrammar {
        name: "time-first",
        parse: time_first,
    },
    LineGrammar {
        name: "compact-ocr",
        parse: compact_ocr,
    },
    LineGrammar {
        name: "no-separator",
        parse: no_separator,
    },
];

/// Build an entry from the three captured fields, or reject it.
fn build_entry(time: &str, class: &str, trainer: &str, config: &ExtractConfig) -> Option<RawEntry> {
    let mut time = parse_time(time)?;
    if config.remap_ambiguous_hours {
        time = time.remap_ambiguous();
    }

    let (trainer_name, theme) = clean_trainer_name(trainer);
    if !is_valid_trainer(&trainer_name) {
        return None;
    }

    let class_name = clean_class_name(class);
    if class_name.is_empty() {
        return None;
    }

    Some(RawEntry {
        time: time.to_string(),
        class_name,
        trainer_name,
        theme,
    })
}

// ---------------------------------------------------------------------------
// time-first: "7:30 AM Barre 57 - Anisha"
// ---------------------------------------------------------------------------

fn time_first_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<time>{TIME_TOKEN})\s+(?P<class>.+?)\s*[-\u{{2013}}\u{{2014}}]\s*(?P<trainer>[^-\u{{2013}}\u{{2014}}]+?)\s*$"
        ))
        .unwrap()
    })
}

/// Time, whitespace, class name, the last hyphen-like separator, trainer.
pub fn time_first(segment: &str, config: &ExtractConfig) -> Option<RawEntry> {
    let caps = time_first_regex().captures(segment)?;
    build_entry(&caps["time"], &caps["class"], &caps["trainer"], config)
}

// ---------------------------------------------------------------------------
// hyphenated-trainer: "7:00 AM Barre 57 - Jean-Paul"
// ---------------------------------------------------------------------------

fn hyphenated_trainer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<time>{TIME_TOKEN})\s+(?P<class>.+?)\s+[-\u{{2013}}\u{{2014}}]\s+(?P<trainer>[A-Z][A-Za-z'\u{{2019}}]+-[A-Z][A-Za-z'\u{{2019}}]+(?:\s+[^-\u{{2013}}\u{{2014}}]+?)?)\s*$"
        ))
        .unwrap()
    })
}

/// A spaced separator followed by a name whose first word is hyphenated.
/// The hyphen inside the name is not a separator.
pub fn hyphenated_trainer(segment: &str, config: &ExtractConfig) -> Option<RawEntry> {
    let caps = hyphenated_trainer_regex().captures(segment)?;
    build_entry(&caps["time"], &caps["class"], &caps["trainer"], config)
}

// ---------------------------------------------------------------------------
// compact-ocr: "730AMFT-Pramal", "S00AMBARRE 57 - Anisha"
// ---------------------------------------------------------------------------

fn compact_ocr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<time>{TIME_TOKEN})(?P<class>[A-Za-z(].*?)\s*[-\u{{2013}}\u{{2014}}]\s*(?P<trainer>[^-\u{{2013}}\u{{2014}}]+?)\s*$"
        ))
        .unwrap()
    })
}

/// Time glued directly to the class name, as OCR produces when it loses the
/// space after the meridiem.
pub fn compact_ocr(segment: &str, config: &ExtractConfig) -> Option<RawEntry> {
    let caps = compact_ocr_regex().captures(segment)?;
    build_entry(&caps["time"], &caps["class"], &caps["trainer"], config)
}

// ---------------------------------------------------------------------------
// no-separator: "7:30 AM Barre 57 Anisha"
// ---------------------------------------------------------------------------

fn no_separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<time>{TIME_TOKEN})\s*(?P<class>[^-\u{{2013}}\u{{2014}}]+?)\s+(?P<trainer>[A-Z][A-Za-z'\u{{2019}}]{{2,}})\s*$"
        ))
        .unwrap()
    })
}

/// No separator at all: the trailing capitalised word is the trainer.
pub fn no_separator(segment: &str, config: &ExtractConfig) -> Option<RawEntry> {
    let caps = no_separator_regex().captures(segment)?;
    build_entry(&caps["time"], &caps["class"], &caps["trainer"], config)
}
