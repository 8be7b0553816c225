use serde::Serialize;

use crate::model::ComparisonResult;

/// Counts over a list of comparison results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconSummary {
    pub matched: usize,
    /// Authoritative entries with no derived counterpart.
    pub unmatched_authoritative: usize,
    /// Derived entries that did not match, paired or not.
    pub unmatched_derived: usize,
    /// Paired entries that differ in at least one field.
    pub field_mismatches: usize,
    pub total: usize,
}

pub fn summarize(results: &[ComparisonResult]) -> ReconSummary {
    let mut summary = ReconSummary {
        total: results.len(),
        ..ReconSummary::default()
    };

    for result in results {
        match (&result.authoritative, &result.derived, result.is_match) {
            (_, _, true) => summary.matched += 1,
            (Some(_), None, false) => summary.unmatched_authoritative += 1,
            (None, Some(_), false) => summary.unmatched_derived += 1,
            (Some(_), Some(_), false) => {
                summary.unmatched_derived += 1;
                summary.field_mismatches += 1;
            }
            (None, None, false) => {}
        }
    }

    summary
}
