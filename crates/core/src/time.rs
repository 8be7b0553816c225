//! Class-time recognition and normalization.
//!
//! OCR hands us times in many shapes: `7:30 AM`, `7.30 AM`, `730AM`,
//! `1030AM`, and digit substitutions such as `S00AM` for `9:00 AM`.  Every
//! accepted shape normalizes to [`ClassTime`], whose `Display` form is the
//! canonical `"H:MM AM"`.  Out-of-range hours or minutes are rejected, never
//! clamped.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::Serialize;

/// Time token as it appears inside OCR'd text.  Shared by the line grammars
/// so that every stage agrees on what counts as a time.
pub(crate) const TIME_TOKEN: &str =
    r"\b(?:[S\d]{1,2}\s?[:.]\s?\d{2}|[S\d]{3,4})\s?[AaPp]\.?\s?[Mm]\.?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClassTime {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
}

impl ClassTime {
    /// Build a 12-hour time.  `hour` must be 1..=12 and `minute` 0..=59.
    pub fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Option<Self> {
        if !(1..=12).contains(&hour) || minute >= 60 {
            return None;
        }
        Some(Self {
            hour,
            minute,
            meridiem,
        })
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        let (pm, hour) = time.hour12();
        Self {
            hour: hour as u8,
            minute: time.minute() as u8,
            meridiem: if pm { Meridiem::Pm } else { Meridiem::Am },
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        let hour24 = match (self.meridiem, self.hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Am, h) => h as u32,
            (Meridiem::Pm, 12) => 12,
            (Meridiem::Pm, h) => h as u32 + 12,
        };
        hour24 * 60 + self.minute as u32
    }

    pub fn to_naive(&self) -> NaiveTime {
        let minutes = self.minutes_since_midnight();
        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or(NaiveTime::MIN)
    }

    /// 24-hour `"HH:MM"` sort key.
    pub fn key24(&self) -> String {
        self.to_naive().format("%H:%M").to_string()
    }

    /// Undo two common OCR slips on early-morning times: a dropped leading
    /// "1" (`1:30 AM` read for `11:30 AM`) and a misread meridiem on 2-4 AM.
    pub fn remap_ambiguous(self) -> Self {
        match (self.meridiem, self.hour) {
            (Meridiem::Am, 1) => Self { hour: 11, ..self },
            (Meridiem::Am, 2..=4) => Self {
                meridiem: Meridiem::Pm,
                ..self
            },
            _ => self,
        }
    }
}

impl fmt::Display for ClassTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.meridiem {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        };
        write!(f, "{}:{:02} {}", self.hour, self.minute, suffix)
    }
}

/// A time token located inside a longer string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
    pub range: Range<usize>,
    /// `None` when the token looked like a time but failed validation.
    pub time: Option<ClassTime>,
}

fn time_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIME_TOKEN).expect("time token pattern is valid"))
}

fn full_twelve_hour_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<hm>[S\d]{1,2}\s?[:.]\s?\d{2}|[S\d]{3,4})\s?(?P<mer>[AaPp])\.?\s?[Mm]\.?$",
        )
        .expect("twelve-hour pattern is valid")
    })
}

fn full_twenty_four_hour_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<h>\d{1,2})[:.](?P<m>\d{2})(?::\d{2})?$")
            .expect("twenty-four-hour pattern is valid")
    })
}

/// Parse the hour/minute part of a 12-hour token (`"7:30"`, `"7.30"`,
/// `"730"`, `"S00"`).
fn parse_hour_minute(raw: &str) -> Option<(u8, u8)> {
    let mut digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.starts_with(['S', 's']) {
        digits.replace_range(0..1, "9");
    }

    let (hour, minute) = match digits.find([':', '.']) {
        Some(idx) => (&digits[..idx], &digits[idx + 1..]),
        None => match digits.len() {
            3 => digits.split_at(1),
            4 => digits.split_at(2),
            _ => return None,
        },
    };

    if !hour.chars().all(|c| c.is_ascii_digit()) || !minute.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((hour.parse().ok()?, minute.parse().ok()?))
}

/// Parse a complete time string.  Accepts every 12-hour OCR shape plus
/// 24-hour `"HH:MM"` as exported by spreadsheets.
pub fn parse_time(input: &str) -> Option<ClassTime> {
    let trimmed = input.trim();

    if let Some(caps) = full_twelve_hour_regex().captures(trimmed) {
        let (hour, minute) = parse_hour_minute(&caps["hm"])?;
        let meridiem = if caps["mer"].eq_ignore_ascii_case("p") {
            Meridiem::Pm
        } else {
            Meridiem::Am
        };
        return ClassTime::new(hour, minute, meridiem);
    }

    let caps = full_twenty_four_hour_regex().captures(trimmed)?;
    let hour: u32 = caps["h"].parse().ok()?;
    let minute: u32 = caps["m"].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0).map(ClassTime::from_naive)
}

/// Normalize a time string to `"H:MM AM"`, or `None` if it is unparseable.
pub fn normalize_time(input: &str) -> Option<String> {
    parse_time(input).map(|t| t.to_string())
}

/// Minutes since midnight for a time string, if it parses.
pub fn to_minutes(input: &str) -> Option<u32> {
    parse_time(input).map(|t| t.minutes_since_midnight())
}

/// `"HH:MM"` sort key; unparseable input falls back to its trimmed self so
/// that it still sorts deterministically.
pub fn time_key(input: &str) -> String {
    parse_time(input)
        .map(|t| t.key24())
        .unwrap_or_else(|| input.trim().to_string())
}

/// Locate every time-looking token in `text`, in order.
pub fn find_times(text: &str) -> Vec<TimeMatch> {
    time_token_regex()
        .find_iter(text)
        .map(|m| TimeMatch {
            range: m.range(),
            time: parse_time(m.as_str()),
        })
        .collect()
}

/// The time token at the very start of `text` (after leading whitespace).
pub fn leading_time(text: &str) -> Option<TimeMatch> {
    let offset = text.len() - text.trim_start().len();
    find_times(text)
        .into_iter()
        .next()
        .filter(|m| m.range.start == offset)
}
