//! Grouped report writer.
//!
//! One CSV row per attendee, in group order, tagged with the 1-based group
//! number. The destination is rewritten in full on every run.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ReportResult;
use crate::models::Attendee;
use crate::transform::grouper::Grouping;

/// Output header row, in column order.
pub const REPORT_HEADERS: [&str; 16] = [
    "Group",
    "ID",
    "Name",
    "Pronouns",
    "Pronouns Code",
    "Residential College",
    "Difficulty",
    "Days",
    "Arts",
    "Food",
    "Location",
    "LocationCoordinates",
    "School",
    "Preference 1",
    "Preference 2",
    "Preference 3",
];

/// Timestamp format used in output file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Field order must match [`REPORT_HEADERS`].
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    group: usize,
    id: &'a str,
    name: &'a str,
    pronouns: &'a str,
    pronouns_code: f64,
    residential_college: &'a str,
    difficulty: &'a str,
    days: &'a str,
    arts: &'a str,
    food: &'a str,
    location: &'a str,
    location_coordinates: String,
    school: &'a str,
    preference_1: f64,
    preference_2: f64,
    preference_3: f64,
}

impl<'a> ReportRow<'a> {
    fn new(group: usize, a: &'a Attendee) -> ReportResult<Self> {
        Ok(Self {
            group,
            id: &a.id,
            name: &a.name,
            pronouns: &a.pronouns,
            pronouns_code: a.pronouns_code,
            residential_college: &a.residential_college,
            difficulty: &a.difficulty,
            days: &a.days,
            arts: &a.arts,
            food: &a.food,
            location: &a.location,
            location_coordinates: serde_json::to_string(&a.location_coordinates)?,
            school: &a.school,
            preference_1: a.preference_1,
            preference_2: a.preference_2,
            preference_3: a.preference_3,
        })
    }
}

/// Write the report to any writer. Returns the number of data rows.
pub fn write_report_to<W: Write>(grouping: &Grouping, writer: W) -> ReportResult<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(REPORT_HEADERS)?;

    let mut rows = 0;
    for group in grouping.groups() {
        for attendee in group.members {
            wtr.serialize(ReportRow::new(group.number, attendee)?)?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

/// Write the report to `path`, creating parent directories as needed.
pub fn write_report(grouping: &Grouping, path: &Path) -> ReportResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(path)?;
    write_report_to(grouping, file)
}

/// `<out_dir>/<input stem>Output_<timestamp>.<input extension or csv>`
pub fn timestamped_output_path(input: &Path, out_dir: &Path, now: DateTime<Local>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("groups");
    let ext = input
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("csv");

    out_dir.join(format!("{}Output_{}.{}", stem, now.format(TIMESTAMP_FORMAT), ext))
}
