use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Case-insensitive match against the full weekday name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(name))
    }

    /// Match a single token that is either a full weekday name or a prefix of
    /// at least three letters ("MON", "Tues", "THURS").  Surrounding
    /// punctuation is ignored.
    pub fn from_token(token: &str) -> Option<Self> {
        let cleaned: String = token
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if cleaned.chars().count() < 3 {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|day| day.name().to_lowercase().starts_with(&cleaned))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Weekday {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| ScheduleError::UnknownWeekday(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Extractor output
// ---------------------------------------------------------------------------

/// A positioned run of text reported by the token extractor.  Coordinates are
/// in pixel space with `y` growing downwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

/// One page as handed over by the token extractor: either positioned
/// fragments or a flat newline-delimited blob when no geometry is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedPage {
    Fragments(Vec<PositionedFragment>),
    Text(String),
}

/// A horizontal band of the page owned by one weekday header.
///
/// `x_min..x_max` is half-open; the first column starts at negative infinity
/// and the last one is unbounded above, so columns partition the axis.
#[derive(Debug, Clone)]
pub struct DayColumn {
    pub day: Weekday,
    pub x_min: f32,
    pub x_max: f32,
    pub fragments: Vec<PositionedFragment>,
}

impl DayColumn {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.x_min && x < self.x_max
    }
}

/// Lines (or per-entry segments) recovered for each weekday.
pub type DayLines = BTreeMap<Weekday, Vec<String>>;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// An entry as read off a single line, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawEntry {
    /// `"H:MM AM"` / `"H:MM PM"`.
    pub time: String,
    pub class_name: String,
    pub trainer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub day: Weekday,
    pub time: String,
    pub class_name: String,
    pub trainer: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub identity_key: String,
}

impl ScheduleEntry {
    pub fn new(
        day: Weekday,
        time: impl Into<String>,
        class_name: impl Into<String>,
        trainer: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let time = time.into();
        let class_name = class_name.into();
        let trainer = trainer.into();
        let location = location.into();
        let identity_key = identity_key(day, &time, &class_name, &trainer, &location);
        Self {
            day,
            time,
            class_name,
            trainer,
            location,
            theme: None,
            identity_key,
        }
    }

    pub fn with_theme(mut self, theme: Option<String>) -> Self {
        self.theme = theme;
        self
    }
}

/// Lower-cased, whitespace-free concatenation of the identifying fields.
pub fn identity_key(
    day: Weekday,
    time: &str,
    class_name: &str,
    trainer: &str,
    location: &str,
) -> String {
    [day.name(), time, class_name, trainer, location]
        .concat()
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The trusted tabular schedule, grouped by weekday in source order.
pub type AuthoritativeSchedule = BTreeMap<Weekday, Vec<ScheduleEntry>>;

/// Group entries by weekday, preserving encounter order within each day.
pub fn group_by_day(entries: &[ScheduleEntry]) -> BTreeMap<Weekday, Vec<ScheduleEntry>> {
    let mut grouped: BTreeMap<Weekday, Vec<ScheduleEntry>> = BTreeMap::new();
    for entry in entries {
        grouped.entry(entry.day).or_default().push(entry.clone());
    }
    grouped
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Day,
    Time,
    ClassName,
    Trainer,
    Location,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Day,
        Field::Time,
        Field::ClassName,
        Field::Trainer,
        Field::Location,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Time => write!(f, "time"),
            Self::ClassName => write!(f, "class"),
            Self::Trainer => write!(f, "trainer"),
            Self::Location => write!(f, "location"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub authoritative: Option<ScheduleEntry>,
    pub derived: Option<ScheduleEntry>,
    pub is_match: bool,
    pub mismatch_reason: String,
    pub discrepancy_fields: BTreeSet<Field>,
}

impl ComparisonResult {
    pub fn derived_only(derived: ScheduleEntry) -> Self {
        Self {
            authoritative: None,
            derived: Some(derived),
            is_match: false,
            mismatch_reason: "no matching authoritative entry found".to_string(),
            discrepancy_fields: Field::ALL.into_iter().collect(),
        }
    }

    pub fn authoritative_only(authoritative: ScheduleEntry) -> Self {
        Self {
            authoritative: Some(authoritative),
            derived: None,
            is_match: false,
            mismatch_reason: "no matching derived entry found".to_string(),
            discrepancy_fields: Field::ALL.into_iter().collect(),
        }
    }
}
