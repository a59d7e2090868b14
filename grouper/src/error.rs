//! Error types for the grouping pipeline.
//!
//! - [`CsvError`] - Input reading and row mapping errors
//! - [`GeocodeError`] - Geocoding lookup errors (never fatal to a run)
//! - [`GroupingError`] - Group assignment errors
//! - [`ReportError`] - Output writing errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Ingestion Errors
// =============================================================================

/// Errors while reading the input table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid CSV structure.
    #[error("Invalid CSV format: {0}")]
    Parse(String),

    /// A cell could not be converted to the field's type.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        message: String,
    },

    /// No header row found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::Parse(err.to_string())
    }
}

// =============================================================================
// Geocoding Errors
// =============================================================================

/// Errors from the geocoding client.
///
/// The pipeline logs these per attendee and keeps going.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The HTTP client could not be built from the given settings.
    #[error("Invalid geocoder configuration: {0}")]
    Client(String),

    /// Request could not be sent or the body could not be read.
    #[error("Geocoding request failed: {0}")]
    Request(String),

    /// Request exceeded the configured timeout.
    #[error("Geocoding request timed out")]
    Timeout,

    /// Service answered with a non-success status.
    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    /// Response body was not a usable place list.
    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else if let Some(status) = err.status() {
            GeocodeError::Status(status.as_u16())
        } else {
            GeocodeError::Request(err.to_string())
        }
    }
}

// =============================================================================
// Grouping Errors
// =============================================================================

/// Errors during group assignment.
#[derive(Debug, Error)]
pub enum GroupingError {
    /// Group size must be at least one.
    #[error("Group size must be greater than zero")]
    ZeroGroupSize,
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while writing the grouped report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to create or write the destination.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("Failed to serialize row: {0}")]
    Csv(#[from] csv::Error),

    /// Coordinates could not be encoded.
    #[error("Failed to encode coordinates: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::group_csv`].
/// Geocoding errors never reach it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Grouping was misconfigured.
    #[error("Grouping error: {0}")]
    Grouping(#[from] GroupingError),

    /// Output could not be written.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for geocoding operations.
pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let csv_err = CsvError::NoHeaders;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("No headers"));

        let grouping_err = GroupingError::ZeroGroupSize;
        let pipeline_err: PipelineError = grouping_err.into();
        assert!(pipeline_err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_invalid_value_format() {
        let err = CsvError::InvalidValue {
            line: 5,
            column: "preference_1".into(),
            value: "abc".into(),
            message: "expected a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'preference_1'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_geocode_status_format() {
        assert_eq!(
            GeocodeError::Status(429).to_string(),
            "Geocoding service returned HTTP 429"
        );
    }
}
