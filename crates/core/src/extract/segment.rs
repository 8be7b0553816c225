//! Splitting a line that holds several entries into one segment per entry.
//!
//! OCR routinely glues neighbouring columns together:
//!
//! ```text
//! 7:15 AM STRENGTH (PULL) - Anisha 7:30 AM powerCycle - Richard
//! └──────── segment 1 ────────────┘└──────── segment 2 ───────┘
//! ```
//!
//! The walk below visits each hyphen-like separator once, looking at the text
//! on either side of it. Boundaries are byte spans over regex matches, so the
//! segments of a line are disjoint and a trainer can never end up in two
//! entries.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::clean::is_class_fragment;
use crate::time::{find_times, TimeMatch};

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*[-\u{2013}\u{2014}]\s*").unwrap())
}

/// Byte span of one entry within its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub span: Range<usize>,
}

impl Segment {
    fn new(line: &str, span: Range<usize>) -> Option<Self> {
        let text = &line[span.clone()];
        let start = span.start + (text.len() - text.trim_start().len());
        let end = span.start + text.trim_end().len();
        (start < end).then_some(Self { span: start..end })
    }

    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.span.clone()]
    }
}

fn times_within<'t>(times: &'t [TimeMatch], range: &Range<usize>) -> Vec<&'t TimeMatch> {
    times
        .iter()
        .filter(|t| t.range.start >= range.start && t.range.start < range.end)
        .collect()
}

/// End of a trainer that starts at `parts[from]`, carried across hyphens
/// inside a name such as `Jean-Paul`: a separator with no surrounding
/// whitespace followed by a capitalised word. When the continuation runs into
/// another time, the trainer ends where that time begins.
fn hyphenated_name_end(
    line: &str,
    times: &[TimeMatch],
    separators: &[Range<usize>],
    parts: &[Range<usize>],
    from: usize,
) -> usize {
    let mut end = parts[from].end;
    for (j, sep) in separators.iter().enumerate().skip(from) {
        let tight = line[sep.clone()].trim().len() == sep.len();
        let next = &parts[j + 1];
        if !tight || !line[next.clone()].starts_with(char::is_uppercase) {
            break;
        }
        if let Some(time) = times_within(times, next).first() {
            return time.range.start;
        }
        end = next.end;
    }
    end
}

/// Compute the entry segments of a line.
///
/// For every separator, the left side must contain a time (it is
/// `time + class`) and the right side is examined:
///
/// - words followed by another time: the words are this entry's trainer and
///   the remainder, from that time on, is fed back in as the next left side;
/// - only a time: this entry has no trainer and the next one starts there;
/// - no time, with more separators ahead and a class-word candidate (for
///   example `Express`): the separator was part of the class name;
/// - otherwise the whole right side is the trainer, including any
///   hyphenated continuation of the name.
///
/// Times that are not followed by any separator produce segments running to
/// the next time. Lines without a time produce nothing.
pub fn segment_line(line: &str) -> Vec<Segment> {
    let times = find_times(line);
    if times.is_empty() {
        return Vec::new();
    }

    let separators: Vec<Range<usize>> = separator_regex()
        .find_iter(line)
        .map(|m| m.range())
        .collect();

    // parts[k] is the text between separator k-1 and separator k.
    let mut parts: Vec<Range<usize>> = Vec::with_capacity(separators.len() + 1);
    let mut part_start = 0;
    for sep in &separators {
        parts.push(part_start..sep.start);
        part_start = sep.end;
    }
    parts.push(part_start..line.len());

    let mut segments = Vec::new();
    let push = |span: Range<usize>, segments: &mut Vec<Segment>| {
        if let Some(segment) = Segment::new(line, span) {
            segments.push(segment);
        }
    };

    let mut cursor = 0usize;
    for (k, sep) in separators.iter().enumerate() {
        let left = cursor..parts[k].end;
        let left_times = times_within(&times, &left);
        let Some(entry) = left_times.last() else {
            // Not a `time + class` part; drop it.
            cursor = cursor.max(sep.end);
            continue;
        };

        // Earlier times on the left have no separator of their own.
        for pair in left_times.windows(2) {
            push(pair[0].range.start..pair[1].range.start, &mut segments);
        }
        let entry_start = entry.range.start;

        let right = parts[k + 1].clone();
        match times_within(&times, &right).first() {
            Some(next) if !line[right.start..next.range.start].trim().is_empty() => {
                push(entry_start..next.range.start, &mut segments);
                cursor = next.range.start;
            }
            Some(next) => {
                push(entry_start..sep.start, &mut segments);
                cursor = next.range.start;
            }
            None => {
                let candidate = line[right.clone()].trim();
                if k + 1 < separators.len() && is_class_fragment(candidate) {
                    cursor = entry_start;
                    continue;
                }
                let end = hyphenated_name_end(line, &times, &separators, &parts, k + 1);
                push(entry_start..end, &mut segments);
                cursor = end;
            }
        }
    }

    let tail = cursor..line.len();
    let tail_times = times_within(&times, &tail);
    for (i, time) in tail_times.iter().enumerate() {
        let end = tail_times
            .get(i + 1)
            .map(|t| t.range.start)
            .unwrap_or(line.len());
        push(time.range.start..end, &mut segments);
    }

    segments
}

/// Split a line into per-entry text segments.
pub fn split_segments(line: &str) -> Vec<&str> {
    segment_line(line)
        .iter()
        .map(|segment| segment.text(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry() {
        assert_eq!(split_segments("7:15 AM Barre 57 - Anisha"), vec!["7:15 AM Barre 57 - Anisha"]);
    }

    #[test]
    fn test_trainer_then_time_reinjects_remainder() {
        assert_eq!(
            split_segments("7:15 AM STRENGTH (PULL) - Anisha 7:30 AM powerCycle - Richard"),
            vec!["7:15 AM STRENGTH (PULL) - Anisha", "7:30 AM powerCycle - Richard"]
        );
    }

    #[test]
    fn test_compact_ocr_second_entry() {
        assert_eq!(
            split_segments("7:30 AM BARRE 57 - Simonelle 730AM FT-Pramal"),
            vec!["7:30 AM BARRE 57 - Simonelle", "730AM FT-Pramal"]
        );
    }

    #[test]
    fn test_hyphen_inside_class_name() {
        assert_eq!(
            split_segments("9:00 AM Barre 57 - Express - Anisha"),
            vec!["9:00 AM Barre 57 - Express - Anisha"]
        );
    }

    #[test]
    fn test_hyphenated_trainer_kept_whole() {
        assert_eq!(
            split_segments("7:00 AM Barre 57 - Jean-Paul"),
            vec!["7:00 AM Barre 57 - Jean-Paul"]
        );
        assert_eq!(
            split_segments("7:00 AM Barre 57 - Jean-Paul 8:00 AM FIT - Richard"),
            vec!["7:00 AM Barre 57 - Jean-Paul", "8:00 AM FIT - Richard"]
        );
    }

    #[test]
    fn test_missing_trainer_before_next_time() {
        assert_eq!(
            split_segments("7:00 AM Mat 57 - 8:00 AM FIT - Richard"),
            vec!["7:00 AM Mat 57", "8:00 AM FIT - Richard"]
        );
    }

    #[test]
    fn test_undashed_entries_split_on_times() {
        assert_eq!(
            split_segments("7:00 AM Barre 57 Anisha 8:00 AM Mat 57 Richard"),
            vec!["7:00 AM Barre 57 Anisha", "8:00 AM Mat 57 Richard"]
        );
    }

    #[test]
    fn test_leading_noise_dropped() {
        assert_eq!(
            split_segments("Kemps - 7:15 AM Barre 57 - Anisha"),
            vec!["7:15 AM Barre 57 - Anisha"]
        );
    }

    #[test]
    fn test_line_without_time() {
        assert!(split_segments("Barre 57 - Anisha").is_empty());
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn test_segments_are_disjoint() {
        let line = "6:00 AM A - B 6:30 AM C - D - E 7:00 AM F 7:30 AM G - H";
        let segments = segment_line(line);
        for pair in segments.windows(2) {
            assert!(pair[0].span.end <= pair[1].span.start);
        }
    }
}
