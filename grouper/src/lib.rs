//! # Footie grouper - survey responses to trip groups
//!
//! Reads survey responses, turns categorical answers into numeric codes,
//! geocodes each respondent's home location, and partitions everyone into
//! fixed-size groups of respondents with similar preferences.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Survey CSV │────▶│   Parser    │────▶│   Enrich    │────▶│   Grouper   │
//! │  (any enc.) │     │  (auto-enc) │     │ (codes+geo) │     │ (sort+chunk)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    ▼
//!                                                             ┌─────────────┐
//!                                                             │ Report CSV  │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use footie::{group_csv, NominatimClient};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let geocoder = NominatimClient::from_env().unwrap();
//!     let summary = group_csv(Path::new("responses.csv"), Path::new("groups.csv"), &geocoder)
//!         .await
//!         .unwrap();
//!     println!("{} groups", summary.group_count);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`logs`] - Run log broadcaster
//! - [`models`] - Attendee and coordinates
//! - [`parser`] - CSV reading with auto-detection
//! - [`enrich`] - Categorical codes and geocoding
//! - [`transform`] - Grouping and the end-to-end pipeline
//! - [`report`] - Grouped CSV output

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Ingestion
pub mod parser;

// Enrichment
pub mod enrich;

// Grouping
pub mod transform;

// Output
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, GeocodeError, GroupingError, PipelineError, ReportError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Attendee, Coordinates};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    normalize_header,
    parse_bytes_auto,
    parse_csv_file_auto,
    ParseResult,
    Row,
};

// =============================================================================
// Re-exports - Enrichment
// =============================================================================

pub use enrich::{
    assign_codes,
    assign_location,
    Geocoder,
    GeocoderConfig,
    LocationOutcome,
    NominatimClient,
    OfflineGeocoder,
};

// =============================================================================
// Re-exports - Grouping & Pipeline
// =============================================================================

pub use transform::{
    assign_groups,
    group_attendees,
    group_csv,
    GeocodeStats,
    Group,
    Grouping,
    RunSummary,
    DEFAULT_GROUP_SIZE,
};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{timestamped_output_path, write_report, REPORT_HEADERS};
