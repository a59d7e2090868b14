//! Per-attendee enrichment: categorical answers to numeric codes, plus geocoding.
//!
//! Each `assign_*` step reads only the attendee's own raw fields and writes
//! exactly one derived field, so the steps can run in any order.
//!
//! ```rust,ignore
//! use footie::enrich::{assign_codes, assign_location, NominatimClient};
//!
//! assign_codes(&mut attendee);
//! let client = NominatimClient::from_env()?;
//! assign_location(&mut attendee, &client).await;
//! ```

pub mod geocode;

use crate::logs::{log_error, log_warning};
use crate::models::Attendee;

pub use geocode::{Geocoder, GeocoderConfig, NominatimClient, OfflineGeocoder};

// =============================================================================
// Lookup tables
// =============================================================================

pub const DIFFICULTY_CODES: &[(&str, f64)] = &[
    ("Easy: a mellow trip, though still some challenges!", 1.0),
    ("Moderate: a few ups and downs, some rough terrain", 2.0),
    ("Strenuous: some ups and downs, some rough terrain", 3.0),
    ("Very strenuous: lots of hiking up and down, rough terrain", 4.0),
];

/// Unrecognized difficulty answers are treated as the most strenuous.
pub const DEFAULT_DIFFICULTY_CODE: f64 = 4.0;

pub const PRONOUN_CODES: &[(&str, f64)] = &[
    ("he/him", 1.0),
    ("he/they", 1.0),
    ("she/her", 2.0),
    ("she/they", 2.0),
];

pub const DEFAULT_PRONOUN_CODE: f64 = 3.0;

pub const DAYS_CODES: &[(&str, f64)] = &[
    ("Yes, I am interested in day hikes only", 1.0),
    ("I am NOT interested in day hikes.", 2.0),
];

pub const ARTS_CODES: &[(&str, f64)] = &[
    ("Yes, I am interested in the arts-focused trips only", 1.0),
    ("I am NOT interested in the arts-focused trips.", 2.0),
];

/// Sentinel for "no clear preference", between the two known answers.
pub const AMBIVALENT_CODE: f64 = 1.8;

pub const NUT_FLAGGED_CODE: f64 = 2.0;
pub const NO_NUT_CODE: f64 = 1.0;

/// Exact-match lookup with a fallback code.
fn lookup(table: &[(&str, f64)], raw: &str, default: f64) -> f64 {
    table
        .iter()
        .find(|(answer, _)| *answer == raw)
        .map(|(_, code)| *code)
        .unwrap_or(default)
}

// =============================================================================
// Categorical steps
// =============================================================================

pub fn assign_difficulty(attendee: &mut Attendee) {
    attendee.difficulty_code = lookup(DIFFICULTY_CODES, &attendee.difficulty, DEFAULT_DIFFICULTY_CODE);
}

pub fn assign_pronouns(attendee: &mut Attendee) {
    attendee.pronouns_code = lookup(PRONOUN_CODES, &attendee.pronouns, DEFAULT_PRONOUN_CODE);
}

pub fn assign_days(attendee: &mut Attendee) {
    attendee.days_code = lookup(DAYS_CODES, &attendee.days, AMBIVALENT_CODE);
}

pub fn assign_arts(attendee: &mut Attendee) {
    attendee.arts_code = lookup(ARTS_CODES, &attendee.arts, AMBIVALENT_CODE);
}

/// Flags any dietary answer mentioning "nut", in any case.
pub fn assign_food(attendee: &mut Attendee) {
    attendee.food_code = if attendee.food.to_lowercase().contains("nut") {
        NUT_FLAGGED_CODE
    } else {
        NO_NUT_CODE
    };
}

/// Run every categorical step on one attendee.
pub fn assign_codes(attendee: &mut Attendee) {
    assign_difficulty(attendee);
    assign_pronouns(attendee);
    assign_days(attendee);
    assign_arts(attendee);
    assign_food(attendee);
}

// =============================================================================
// Geocoding step
// =============================================================================

/// What happened when geocoding one attendee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOutcome {
    Resolved,
    /// Service answered but had no match
    NotFound,
    /// Lookup failed; the error was logged
    Failed,
    /// Location was blank, no lookup made
    Skipped,
}

/// Geocode the attendee's location into `location_coordinates`.
///
/// Never fails: misses and errors are logged and the coordinates keep
/// their default.
pub async fn assign_location<G: Geocoder>(attendee: &mut Attendee, geocoder: &G) -> LocationOutcome {
    let query = attendee.location.trim();
    if query.is_empty() || !geocoder.enabled() {
        return LocationOutcome::Skipped;
    }

    match geocoder.geocode(query).await {
        Ok(Some(coordinates)) => {
            attendee.location_coordinates = coordinates;
            LocationOutcome::Resolved
        }
        Ok(None) => {
            log_warning(format!("No match for location '{}' (ID {})", query, attendee.id));
            LocationOutcome::NotFound
        }
        Err(e) => {
            log_error(format!("Error: {} (location '{}', ID {})", e, query, attendee.id));
            LocationOutcome::Failed
        }
    }
}
