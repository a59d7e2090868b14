//! End-to-end grouping run: read → enrich → group → write.
//!
//! # Example
//!
//! ```rust,ignore
//! use footie::transform::pipeline::group_csv;
//! use footie::enrich::NominatimClient;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let geocoder = NominatimClient::from_env()?;
//!     let summary = group_csv(
//!         Path::new("responses.csv"),
//!         Path::new("outputs/groups.csv"),
//!         &geocoder,
//!     ).await?;
//!
//!     println!("{} groups", summary.group_count);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::grouper::{assign_groups, Grouping, DEFAULT_GROUP_SIZE};
use crate::enrich::{assign_codes, assign_location, Geocoder, LocationOutcome};
use crate::error::{CsvResult, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::Attendee;
use crate::parser::{parse_csv_file_auto, ParseResult};
use crate::report::write_report;

/// Geocoding tally for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeocodeStats {
    pub resolved: usize,
    pub not_found: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl GeocodeStats {
    fn record(&mut self, outcome: LocationOutcome) {
        match outcome {
            LocationOutcome::Resolved => self.resolved += 1,
            LocationOutcome::NotFound => self.not_found += 1,
            LocationOutcome::Failed => self.failed += 1,
            LocationOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Attendees left at the default coordinates
    pub fn unresolved(&self) -> usize {
        self.not_found + self.failed + self.skipped
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub attendee_count: usize,
    pub group_count: usize,
    pub group_size: usize,
    pub geocoding: GeocodeStats,
}

/// Read `input`, group everyone, and write the report to `output`.
///
/// Input and output failures abort the run; geocoding failures only
/// leave the affected attendee at the default coordinates.
pub async fn group_csv<G: Geocoder>(input: &Path, output: &Path, geocoder: &G) -> PipelineResult<RunSummary> {
    log_info(format!("📖 Reading {}", input.display()));
    let parsed = parse_csv_file_auto(input)?;
    log_parse_info(&parsed);

    let attendees = attendees_from_rows(&parsed)?;
    let (grouping, geocoding) = group_attendees(attendees, DEFAULT_GROUP_SIZE, geocoder).await?;

    log_info(format!("💾 Writing {}", output.display()));
    let rows = write_report(&grouping, output)?;
    log_success(format!("Wrote {} rows", rows));

    Ok(RunSummary {
        output_path: output.to_path_buf(),
        attendee_count: rows,
        group_count: grouping.len(),
        group_size: grouping.group_size(),
        geocoding,
    })
}

/// Enrich every attendee in input order, then group them.
pub async fn group_attendees<G: Geocoder>(
    mut attendees: Vec<Attendee>,
    group_size: usize,
    geocoder: &G,
) -> PipelineResult<(Grouping, GeocodeStats)> {
    let mut geocoding = GeocodeStats::default();

    for (i, attendee) in attendees.iter_mut().enumerate() {
        log_info(format!("Assigning Person {}", i + 1));
        assign_codes(attendee);
        geocoding.record(assign_location(attendee, geocoder).await);
    }

    if geocoder.enabled() {
        log_success(format!(
            "Geocoded {} of {} locations",
            geocoding.resolved,
            attendees.len()
        ));
    }

    log_info("Assigning Groups...");
    let grouping = assign_groups(attendees, group_size)?;
    if grouping.is_empty() {
        log_warning("No attendees found, report will only contain headers");
    } else {
        log_success(format!(
            "{} attendees in {} groups of up to {}",
            grouping.attendees().len(),
            grouping.len(),
            group_size
        ));
    }

    Ok((grouping, geocoding))
}

/// Map parsed rows onto attendees, failing on the first bad row.
pub fn attendees_from_rows(parsed: &ParseResult) -> CsvResult<Vec<Attendee>> {
    parsed.rows.iter().map(Attendee::from_row).collect()
}

fn log_parse_info(parsed: &ParseResult) {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} rows", parsed.rows.len()));

    log_info(format!("📋 {} columns:", parsed.headers.len()));
    for (i, col) in parsed.headers.iter().enumerate() {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::OfflineGeocoder;
    use crate::error::{CsvError, GeocodeError, GeocodeResult, PipelineError};
    use crate::logs::{LogLevel, LOG_BROADCASTER};
    use crate::models::Coordinates;
    use std::fs;
    use tokio::sync::broadcast::error::TryRecvError;

    /// Resolves every location except the ones it is told to fail on
    struct TestGeocoder {
        fail_on: &'static str,
    }

    impl Geocoder for TestGeocoder {
        async fn geocode(&self, query: &str) -> GeocodeResult<Option<Coordinates>> {
            if query == self.fail_on {
                return Err(GeocodeError::Request("service unavailable".into()));
            }
            Ok(Some(Coordinates::new(query.len() as f64, 1.0)))
        }
    }

    const HEADER: &str = "id,name,preference_1,preference_2,preference_3,pronouns,residential_college,\
                          difficulty,days,arts,food,location,school";

    fn survey(n: usize) -> String {
        let mut csv = String::from(HEADER);
        for i in 1..=n {
            let location = if i == 5 { "Unmappable Place".to_string() } else { format!("Town {i}") };
            csv.push_str(&format!(
                "\n{i},Person {i},{p},1,0,he/him,Branford,\"Moderate: a few ups and downs, some rough terrain\",,,Peanuts,{location},Public",
                p = i % 4
            ));
        }
        csv
    }

    #[tokio::test]
    async fn test_geocoding_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.csv");
        let output = dir.path().join("out/groups.csv");
        fs::write(&input, survey(9)).unwrap();

        let mut logs = LOG_BROADCASTER.subscribe();
        let geocoder = TestGeocoder { fail_on: "Unmappable Place" };
        let summary = group_csv(&input, &output, &geocoder).await.unwrap();

        assert_eq!(summary.attendee_count, 9);
        assert_eq!(summary.group_count, 2);
        assert_eq!(summary.geocoding.resolved, 8);
        assert_eq!(summary.geocoding.failed, 1);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 9);

        let group_one = rows.iter().filter(|r| &r[0] == "1").count();
        let group_two = rows.iter().filter(|r| &r[0] == "2").count();
        assert_eq!((group_one, group_two), (8, 1));

        let mut ids: Vec<u32> = rows.iter().map(|r| r[1].parse().unwrap()).collect();
        ids.sort();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());

        for row in &rows {
            let coords: Coordinates = serde_json::from_str(&row[11]).unwrap();
            if &row[1] == "5" {
                assert!(coords.is_unset());
            } else {
                assert!(!coords.is_unset());
            }
        }

        // Other tests share the broadcaster, so skip over anything we lagged on
        let mut saw_error = false;
        loop {
            match logs.try_recv() {
                Ok(entry) => {
                    if entry.level == LogLevel::Error && entry.message.contains("Unmappable Place") {
                        saw_error = true;
                    }
                }
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_codes_applied_before_grouping() {
        let attendees = vec![
            Attendee { id: "they".into(), pronouns: "they/them".into(), ..Attendee::default() },
            Attendee { id: "he".into(), pronouns: "he/him".into(), ..Attendee::default() },
            Attendee { id: "she".into(), pronouns: "she/her".into(), ..Attendee::default() },
        ];

        let (grouping, stats) = group_attendees(attendees, 8, &OfflineGeocoder).await.unwrap();

        let order: Vec<&str> = grouping.attendees().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(order, vec!["he", "she", "they"]);
        assert!(grouping.attendees().iter().all(|a| a.difficulty_code == 4.0));
        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.unresolved(), 3);
    }

    #[tokio::test]
    async fn test_header_only_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.csv");
        let output = dir.path().join("groups.csv");
        fs::write(&input, HEADER).unwrap();

        let summary = group_csv(&input, &output, &OfflineGeocoder).await.unwrap();

        assert_eq!(summary.attendee_count, 0);
        assert_eq!(summary.group_count, 0);
        assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn test_bad_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.csv");
        let output = dir.path().join("groups.csv");
        fs::write(&input, "id,preference_1\n1,high").unwrap();

        let err = group_csv(&input, &output, &OfflineGeocoder).await.unwrap_err();

        assert!(matches!(err, PipelineError::Csv(CsvError::InvalidValue { line: 2, .. })));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = group_csv(&dir.path().join("nope.csv"), &dir.path().join("out.csv"), &OfflineGeocoder)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Csv(CsvError::Io(_))));
    }
}
