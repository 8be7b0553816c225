//! Layout reconstruction: from extractor output to per-day lines.
//!
//! Two input shapes are supported:
//!
//! ```text
//! positioned fragments -> header bands -> DayColumn[] -> lines per column
//! flat text            -> cleanup -> boilerplate strip -> header sections
//! ```
//!
//! Positioned pages whose header row was merged by OCR ("MONDAY TUESDAY" in
//! one fragment) are rebuilt into plain lines and routed through the
//! flat-text path, which knows how to distribute merged columns.

use std::collections::HashSet;
use std::sync::OnceLock;

use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cleanup::cleanup_text;
use crate::extract::split_segments;
use crate::model::{DayColumn, DayLines, ExtractedPage, PositionedFragment, Weekday};
use crate::time::find_times;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Header fragments whose X positions differ by at most this much belong
    /// to the same column.
    pub column_tolerance: f32,
    /// Fragments whose Y positions differ by at most this much share a line.
    pub line_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_tolerance: 30.0,
            line_tolerance: 12.0,
        }
    }
}

/// Reconstruct per-day lines from a single extracted page.
pub fn reconstruct(page: &ExtractedPage, config: &LayoutConfig) -> DayLines {
    match page {
        ExtractedPage::Fragments(fragments) => reconstruct_fragments(fragments, config),
        ExtractedPage::Text(text) => reconstruct_text(text),
    }
}

// ---------------------------------------------------------------------------
// Positioned-fragment mode
// ---------------------------------------------------------------------------

/// A fragment that names one or more weekdays and carries no class time.
#[derive(Debug, Clone)]
struct HeaderFragment {
    index: usize,
    days: Vec<Weekday>,
    x: f32,
    y: f32,
}

fn header_fragment(index: usize, fragment: &PositionedFragment) -> Option<HeaderFragment> {
    if !find_times(&fragment.text).is_empty() {
        return None;
    }
    let mut tokens = fragment.text.split_whitespace();
    let first = Weekday::from_token(tokens.next()?)?;
    let mut days = vec![first];
    for day in tokens.filter_map(Weekday::from_token) {
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Some(HeaderFragment {
        index,
        days,
        x: fragment.x,
        y: fragment.y,
    })
}

fn header_fragments(fragments: &[PositionedFragment]) -> Vec<HeaderFragment> {
    fragments
        .iter()
        .enumerate()
        .filter_map(|(i, f)| header_fragment(i, f))
        .collect()
}

/// Group positioned fragments by weekday column, then by line.
///
/// An empty map means no weekday header could be found on the page.
pub fn reconstruct_fragments(fragments: &[PositionedFragment], config: &LayoutConfig) -> DayLines {
    let headers = header_fragments(fragments);

    if headers.is_empty() {
        debug!("no weekday header among {} fragments", fragments.len());
        return DayLines::new();
    }

    if headers.iter().any(|h| h.days.len() > 1) {
        debug!("merged weekday header detected; falling back to flat-text layout");
        let text = group_into_lines(fragments.to_vec(), config.line_tolerance).join("\n");
        return reconstruct_text(&text);
    }

    let mut day_lines = DayLines::new();
    for column in columns_from_headers(fragments, headers, config) {
        let lines = group_into_lines(column.fragments, config.line_tolerance);
        trace!("{}: {} line(s)", column.day, lines.len());
        day_lines.entry(column.day).or_default().extend(lines);
    }
    day_lines
}

/// Build the day columns for a page and assign every non-header fragment to
/// the column whose `[x_min, x_max)` contains its X.
///
/// Header rows are grouped into horizontal bands by Y so that a page holding
/// the week in two stacked blocks (Mon-Thu above, Fri-Sun below) keeps each
/// block's fragments with its own headers.
pub fn detect_day_columns(fragments: &[PositionedFragment], config: &LayoutConfig) -> Vec<DayColumn> {
    columns_from_headers(fragments, header_fragments(fragments), config)
}

fn columns_from_headers(
    fragments: &[PositionedFragment],
    mut headers: Vec<HeaderFragment>,
    config: &LayoutConfig,
) -> Vec<DayColumn> {
    if headers.is_empty() {
        return Vec::new();
    }

    headers.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    // Split header rows into bands.
    let mut bands: Vec<Vec<HeaderFragment>> = Vec::new();
    for header in headers {
        match bands.last_mut() {
            Some(band) if (header.y - band[0].y).abs() <= config.line_tolerance => band.push(header),
            _ => bands.push(vec![header]),
        }
    }

    let header_indices: HashSet<usize> = bands.iter().flatten().map(|h| h.index).collect();
    let mut columns: Vec<DayColumn> = Vec::new();

    for (band_idx, band) in bands.iter().enumerate() {
        let band_top = band[0].y - config.line_tolerance;
        let band_bottom = bands
            .get(band_idx + 1)
            .map(|next| next[0].y - config.line_tolerance)
            .unwrap_or(f32::INFINITY);

        let mut band_columns = cluster_columns(band, config.column_tolerance);
        for (idx, fragment) in fragments.iter().enumerate() {
            if header_indices.contains(&idx) || fragment.y < band_top || fragment.y >= band_bottom {
                continue;
            }
            if let Some(column) = band_columns.iter_mut().find(|c| c.contains(fragment.x)) {
                column.fragments.push(fragment.clone());
            }
        }
        columns.extend(band_columns);
    }

    columns
}

/// Cluster the headers of one band by X and turn the clusters into columns
/// that partition the horizontal axis.
fn cluster_columns(band: &[HeaderFragment], tolerance: f32) -> Vec<DayColumn> {
    let mut sorted: Vec<&HeaderFragment> = band.iter().collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    // (mean x, member count, day of the first member)
    let mut clusters: Vec<(f32, usize, Weekday)> = Vec::new();
    for header in sorted {
        match clusters.last_mut() {
            Some((mean, count, _)) if (header.x - *mean).abs() <= tolerance => {
                *mean = (*mean * *count as f32 + header.x) / (*count as f32 + 1.0);
                *count += 1;
            }
            _ => clusters.push((header.x, 1, header.days[0])),
        }
    }

    let starts: Vec<f32> = clusters
        .iter()
        .enumerate()
        .map(|(i, (x, _, _))| if i == 0 { f32::NEG_INFINITY } else { x - tolerance })
        .collect();

    clusters
        .iter()
        .enumerate()
        .map(|(i, (_, _, day))| DayColumn {
            day: *day,
            x_min: starts[i],
            x_max: starts.get(i + 1).copied().unwrap_or(f32::INFINITY),
            fragments: Vec::new(),
        })
        .collect()
}

/// Group fragments into text lines by Y proximity.
///
/// Fragments whose Y lies within `tolerance` of the line's first fragment
/// share a line.  Within a line fragments are sorted left-to-right; touching
/// fragments (OCR split a word) are concatenated, others joined by a space.
pub fn group_into_lines(mut fragments: Vec<PositionedFragment>, tolerance: f32) -> Vec<String> {
    if fragments.is_empty() {
        return Vec::new();
    }

    // Top of page first, then left to right.
    fragments.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<PositionedFragment>> = Vec::new();
    for fragment in fragments {
        match lines.last_mut() {
            Some(line) if (fragment.y - line[0].y).abs() <= tolerance => line.push(fragment),
            _ => lines.push(vec![fragment]),
        }
    }

    lines
        .into_iter()
        .map(assemble_line)
        .filter(|line| !line.is_empty())
        .collect()
}

fn assemble_line(mut fragments: Vec<PositionedFragment>) -> String {
    fragments.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut text = String::new();
    let mut prev_end: Option<f32> = None;
    for fragment in &fragments {
        let piece = fragment.text.trim();
        if piece.is_empty() {
            continue;
        }
        let touching = prev_end.is_some_and(|end| fragment.width > 0.0 && fragment.x - end < 1.0);
        if !text.is_empty() && !touching {
            text.push(' ');
        }
        text.push_str(piece);
        prev_end = Some(fragment.x + fragment.width);
    }
    text
}

// ---------------------------------------------------------------------------
// Flat-text mode
// ---------------------------------------------------------------------------

fn weekday_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b").unwrap()
    })
}

fn boilerplate_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Location banners.
            r"(?i)\b(kwality house|kemps corner|supreme hq|bandra|kenkere house|copper \+ cloves|location|studio address)\b",
            // Date ranges: "10th - 16th March", "10/03 to 16/03".
            r"(?i)\b\d{1,2}(st|nd|rd|th)?(\s*[/.]\s*\d{1,2})?\s*(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)?[a-z]*\s*(-|to)\s*\d{1,2}",
            r"(?i)\bweek\s+of\b",
            // Difficulty-level headers.
            r"(?i)^(all\s+levels|beginners?|intermediate|advanced|level\s+\d)\b",
            // Class-list banners.
            r"(?i)^((weekly|class|studio)\s+)*(schedule|timetable|class\s+list|classes)\b",
            // Theme-category banners.
            r"(?i)^(themed?\s+(classes|week|series)|special\s+classes|theme\s*:)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Whether a line is known non-schedule text.  Lines carrying a class time
/// are never boilerplate.
pub fn is_boilerplate(line: &str) -> bool {
    find_times(line).is_empty() && boilerplate_patterns().iter().any(|re| re.is_match(line))
}

#[derive(Debug, Clone, PartialEq)]
struct TextHeader {
    line_index: usize,
    days: Vec<Weekday>,
    /// Schedule text that shared the header line, if any.
    trailing: Option<String>,
}

/// Detect a day header line.  Full weekday names anywhere on a line without
/// a leading time count, as does a line made only of weekday abbreviations.
fn text_header(line_index: usize, line: &str) -> Option<TextHeader> {
    let matches: Vec<regex::Match> = weekday_word_regex().find_iter(line).collect();

    if matches.is_empty() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let days: Vec<Weekday> = tokens.iter().filter_map(|t| Weekday::from_token(t)).collect();
        if days.is_empty() || days.len() != tokens.len() {
            return None;
        }
        return Some(TextHeader {
            line_index,
            days: dedup_days(days),
            trailing: None,
        });
    }

    let times = find_times(line);
    if times.first().is_some_and(|t| t.range.start < matches[0].start()) {
        // Weekday mentioned inside an entry ("7:30 AM Monday Special - ...").
        return None;
    }

    let days = dedup_days(
        matches
            .iter()
            .filter_map(|m| Weekday::from_name(m.as_str()))
            .collect(),
    );
    let last_end = matches.last().map(|m| m.end()).unwrap_or(0);
    let rest = line[last_end..].trim();
    let trailing = (!find_times(rest).is_empty()).then(|| rest.to_string());

    Some(TextHeader {
        line_index,
        days,
        trailing,
    })
}

fn dedup_days(days: Vec<Weekday>) -> Vec<Weekday> {
    let mut out: Vec<Weekday> = Vec::with_capacity(days.len());
    for day in days {
        if !out.contains(&day) {
            out.push(day);
        }
    }
    out
}

/// Slice line-delimited text into per-day sections.
///
/// A header naming one day owns every line up to the next header.  A header
/// naming several days (side-by-side columns that OCR merged into one text
/// stream) has each content line split into per-entry segments, and the
/// segments are dealt round-robin across the named days in order.
pub fn reconstruct_text(text: &str) -> DayLines {
    let cleaned = cleanup_text(text);
    let lines: Vec<&str> = cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let boilerplate = is_boilerplate(line);
            if boilerplate {
                trace!("boilerplate: {line}");
            }
            !boilerplate
        })
        .collect();

    let headers: Vec<TextHeader> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| text_header(i, line))
        .collect();

    let mut day_lines = DayLines::new();
    if headers.is_empty() {
        debug!("no weekday header in {} line(s)", lines.len());
        return day_lines;
    }

    for (idx, header) in headers.iter().enumerate() {
        let section_end = headers
            .get(idx + 1)
            .map(|next| next.line_index)
            .unwrap_or(lines.len());
        let content = header
            .trailing
            .iter()
            .map(String::as_str)
            .chain(lines[header.line_index + 1..section_end].iter().copied());

        if let [day] = header.days.as_slice() {
            day_lines
                .entry(*day)
                .or_default()
                .extend(content.map(str::to_string));
            continue;
        }

        let mut slot = 0usize;
        for line in content {
            for segment in split_segments(line) {
                let day = header.days[slot % header.days.len()];
                day_lines.entry(day).or_default().push(segment.to_string());
                slot += 1;
            }
        }
        debug!(
            "merged header {:?}: dealt {slot} segment(s) across {} day(s)",
            header.days,
            header.days.len()
        );
    }

    day_lines
}
