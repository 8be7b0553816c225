//! Entry extraction: from one reconstructed line to raw entries.
//!
//! A line is first split into per-entry segments ([`segment`]) and every
//! segment is then handed to the grammar cascade ([`grammar::GRAMMARS`]).
//! Segments no grammar accepts, or whose time does not parse, are dropped.

pub mod clean;
pub mod grammar;
pub mod segment;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::model::RawEntry;

pub use clean::{clean_class_name, clean_trainer_name, is_valid_trainer};
pub use grammar::{LineGrammar, GRAMMARS};
pub use segment::{segment_line, split_segments, Segment};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Rewrite early-morning hours that are almost always OCR misreads
    /// (1 AM -> 11 AM, 2-4 AM -> PM).
    pub remap_ambiguous_hours: bool,
}

/// Parse one segment with the first grammar that accepts it.
pub fn extract_segment(segment: &str, config: &ExtractConfig) -> Option<RawEntry> {
    GRAMMARS.iter().find_map(|grammar| {
        let entry = (grammar.parse)(segment, config)?;
        trace!("{}: {segment:?} -> {entry:?}", grammar.name);
        Some(entry)
    })
}

/// Extract every entry found on a line, in line order.
pub fn extract_line(line: &str, config: &ExtractConfig) -> Vec<RawEntry> {
    split_segments(line)
        .into_iter()
        .filter_map(|segment| {
            let entry = extract_segment(segment, config);
            if entry.is_none() {
                trace!("no grammar accepted {segment:?}");
            }
            entry
        })
        .collect()
}
