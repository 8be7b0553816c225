//! CSV ingestion of the authoritative schedule.
//!
//! Headers are matched case-insensitively and ignoring punctuation, so
//! `Class Name`, `class_name` and `className` all name the class column.
//! `location` is optional and falls back to the caller's default. Locations
//! given in the file are resolved against the location vocabulary so they
//! compare equal to locations detected in a document.

use std::path::Path;

use classmatch_core::model::{group_by_day, AuthoritativeSchedule, ScheduleEntry, Weekday};
use classmatch_core::normalize::Normalizer;
use classmatch_core::time::normalize_time;
use log::{debug, warn};

use crate::prelude::*;

const DAY_HEADERS: &[&str] = &["day", "weekday"];
const TIME_HEADERS: &[&str] = &["time", "starttime", "start"];
const CLASS_HEADERS: &[&str] = &["class", "classname"];
const TRAINER_HEADERS: &[&str] = &["trainer", "trainername", "instructor"];
const LOCATION_HEADERS: &[&str] = &["location", "studio"];

fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

pub async fn load_authoritative(
    path: &Path,
    default_location: &str,
    normalizer: &Normalizer,
) -> Result<AuthoritativeSchedule> {
    let data = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| f!("failed to read {}", path.display()))?;
    Ok(parse_authoritative(&data, default_location, normalizer)?)
}

/// Parse CSV text into entries grouped by weekday, preserving row order.
///
/// Blank rows are skipped. A time that does not parse is kept verbatim so
/// that it shows up as a mismatch instead of vanishing.
pub fn parse_authoritative(
    data: &str,
    default_location: &str,
    normalizer: &Normalizer,
) -> Result<AuthoritativeSchedule, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Authoritative(e.to_string()))?
        .iter()
        .map(header_key)
        .collect();

    let position = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|name| *name == h.as_str()))
    };
    let required = |names: &[&str]| {
        position(names).ok_or_else(|| Error::MissingColumn(names[0].to_string()))
    };

    let day_idx = required(DAY_HEADERS)?;
    let time_idx = required(TIME_HEADERS)?;
    let class_idx = required(CLASS_HEADERS)?;
    let trainer_idx = required(TRAINER_HEADERS)?;
    let location_idx = position(LOCATION_HEADERS);

    let mut entries = Vec::new();

    for (offset, record) in reader.records().enumerate() {
        // Row 1 is the header.
        let row = offset + 2;
        let record = record.map_err(|e| Error::AuthoritativeRow {
            row,
            message: e.to_string(),
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = |idx: usize| record.get(idx).unwrap_or("");

        let day: Weekday = field(day_idx).parse().map_err(|e| Error::AuthoritativeRow {
            row,
            message: f!("{e}"),
        })?;

        let raw_time = field(time_idx);
        let time = normalize_time(raw_time).unwrap_or_else(|| {
            warn!("row {row}: unparseable time {raw_time:?}");
            raw_time.to_string()
        });

        let location = location_idx
            .map(field)
            .filter(|l| !l.is_empty())
            .map(|l| normalizer.normalize_location(l))
            .unwrap_or_else(|| default_location.to_string());

        entries.push(ScheduleEntry::new(
            day,
            time,
            collapse(field(class_idx)),
            collapse(field(trainer_idx)),
            location,
        ));
    }

    debug!("loaded {} authoritative entries", entries.len());
    Ok(group_by_day(&entries))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
Day,Time,Class Name,Trainer,Location
Monday,7:15 AM,Studio Strength Lab (Pull),Anisha Shah,\"Kwality House, Kemps Corner\"
Monday,19:30,Studio Barre 57,Simonelle De Vitre,
,,,,
Tuesday,7:30 AM,Studio FIT,Pramal Hinduja,Supreme HQ
";

    #[test]
    fn test_rows_grouped_by_day() {
        let schedule = parse_authoritative(CSV, "Kenkere House", Normalizer::builtin()).unwrap();

        assert_eq!(schedule.len(), 2);
        let monday = &schedule[&Weekday::Monday];
        assert_eq!(monday.len(), 2);
        assert_eq!(monday[0].class_name, "Studio Strength Lab (Pull)");
        assert_eq!(monday[0].location, "Kwality House, Kemps Corner");
        assert_eq!(schedule[&Weekday::Tuesday][0].trainer, "Pramal Hinduja");
    }

    #[test]
    fn test_locations_resolved_to_canonical() {
        let schedule = parse_authoritative(CSV, "Kenkere House", Normalizer::builtin()).unwrap();
        assert_eq!(schedule[&Weekday::Tuesday][0].location, "Supreme HQ, Bandra");
    }

    #[test]
    fn test_times_normalized_and_location_defaulted() {
        let schedule = parse_authoritative(CSV, "Kenkere House", Normalizer::builtin()).unwrap();
        let barre = &schedule[&Weekday::Monday][1];

        assert_eq!(barre.time, "7:30 PM");
        assert_eq!(barre.location, "Kenkere House");
    }

    #[test]
    fn test_header_spellings() {
        let csv = "weekday,START_TIME,className,Instructor\nWed,7:15 AM,Studio FIT,Karan Bhatia\n";
        let schedule = parse_authoritative(csv, "", Normalizer::builtin()).unwrap();

        let entry = &schedule[&Weekday::Wednesday][0];
        assert_eq!(entry.time, "7:15 AM");
        assert_eq!(entry.location, "");
    }

    #[test]
    fn test_missing_column() {
        let csv = "day,time,class\nMonday,7:15 AM,FIT\n";
        let err = parse_authoritative(csv, "", Normalizer::builtin()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "trainer"));
    }

    #[test]
    fn test_unknown_weekday_reports_row() {
        let csv = "day,time,class,trainer\nMonday,7:15 AM,Studio FIT,Karan Bhatia\nFunday,8:00 AM,Studio FIT,Karan Bhatia\n";
        let err = parse_authoritative(csv, "", Normalizer::builtin()).unwrap_err();

        assert!(matches!(err, Error::AuthoritativeRow { row: 3, .. }));
        assert!(err.to_string().contains("Funday"));
    }

    #[test]
    fn test_unparseable_time_kept_verbatim() {
        let csv = "day,time,class,trainer\nFriday,TBD,Studio FIT,Karan Bhatia\n";
        let schedule = parse_authoritative(csv, "", Normalizer::builtin()).unwrap();
        assert_eq!(schedule[&Weekday::Friday][0].time, "TBD");
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{CSV}").unwrap();

        let schedule = load_authoritative(file.path(), "", Normalizer::builtin())
            .await
            .unwrap();
        assert_eq!(schedule[&Weekday::Monday].len(), 2);
    }
}
