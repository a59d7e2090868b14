//! Domain models for the grouping pipeline.
//!
//! - [`Attendee`] - One survey respondent with raw answers and derived codes
//! - [`Coordinates`] - Geocoded latitude/longitude pair

use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};
use crate::parser::Row;

// =============================================================================
// Coordinates
// =============================================================================

/// Geocoded position of an attendee's home location.
///
/// Stays at `{0.0, 0.0}` when the location could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether these are still the unresolved default.
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Attendee
// =============================================================================

/// One survey respondent.
///
/// Built once from an input row with every `*_code` at `0.0` and coordinates
/// at the default; [`crate::enrich`] fills them in. Text fields missing from
/// the input are empty, preference scores missing from the input are `0.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attendee {
    /// Opaque respondent identifier, carried through unchanged.
    pub id: String,
    pub name: String,

    pub preference_1: f64,
    pub preference_2: f64,
    pub preference_3: f64,

    pub pronouns: String,
    pub pronouns_code: f64,

    pub residential_college: String,

    pub difficulty: String,
    pub difficulty_code: f64,

    /// Day-hike preference answer.
    pub days: String,
    pub days_code: f64,

    /// Arts-focused trip preference answer.
    pub arts: String,
    pub arts_code: f64,

    /// Free-text dietary answer.
    pub food: String,
    pub food_code: f64,

    /// Free-text home location, e.g. a city name.
    pub location: String,
    pub location_coordinates: Coordinates,

    pub school: String,
}

impl Attendee {
    /// Map a parsed input row onto an attendee.
    ///
    /// Column names are matched after header normalization (see
    /// [`crate::parser::normalize_header`]). Non-numeric preference
    /// values are rejected with line and column context.
    pub fn from_row(row: &Row) -> CsvResult<Self> {
        Ok(Self {
            id: row.get("id").to_string(),
            name: row.get("name").to_string(),
            preference_1: parse_score(row, "preference_1")?,
            preference_2: parse_score(row, "preference_2")?,
            preference_3: parse_score(row, "preference_3")?,
            pronouns: row.get("pronouns").to_string(),
            residential_college: row.get("residential_college").to_string(),
            difficulty: row.get("difficulty").to_string(),
            days: row.get("days").to_string(),
            arts: row.get("arts").to_string(),
            food: row.get("food").to_string(),
            location: row.get("location").to_string(),
            school: row.get("school").to_string(),
            ..Self::default()
        })
    }

    /// Sort key used to place similar attendees next to each other.
    ///
    /// Sum of squares of the three preference scores and the pronoun code.
    pub fn similarity_key(&self) -> f64 {
        self.preference_1.powi(2)
            + self.preference_2.powi(2)
            + self.preference_3.powi(2)
            + self.pronouns_code.powi(2)
    }
}

fn parse_score(row: &Row, column: &str) -> CsvResult<f64> {
    let raw = row.get(column);
    if raw.trim().is_empty() {
        return Ok(0.0);
    }

    raw.trim().parse::<f64>().map_err(|e| CsvError::InvalidValue {
        line: row.line,
        column: column.to_string(),
        value: raw.to_string(),
        message: e.to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
