//! Location lookup against a Nominatim-compatible geocoding service.
//!
//! All transport settings live on one [`NominatimClient`] built per run
//! and passed to the pipeline explicitly.

use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{GeocodeError, GeocodeResult};
use crate::models::Coordinates;

/// Public OpenStreetMap Nominatim instance
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Something that resolves a free-text place name to coordinates.
///
/// `Ok(None)` means the service answered but found nothing.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    async fn geocode(&self, query: &str) -> GeocodeResult<Option<Coordinates>>;

    /// Whether lookups should be attempted at all.
    fn enabled(&self) -> bool {
        true
    }
}

/// Geocoder used with `--offline`: never looks anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl Geocoder for OfflineGeocoder {
    async fn geocode(&self, _query: &str) -> GeocodeResult<Option<Coordinates>> {
        Ok(None)
    }

    fn enabled(&self) -> bool {
        false
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Settings for [`NominatimClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Identifying client label sent as `User-Agent`
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("footie-grouper/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeocoderConfig {
    /// Read overrides from the environment (and `.env` if present):
    /// `FOOTIE_GEOCODER_URL`, `FOOTIE_GEOCODER_USER_AGENT`,
    /// `FOOTIE_GEOCODER_TIMEOUT_SECS`.
    pub fn from_env() -> GeocodeResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GeocodeResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("FOOTIE_GEOCODER_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(agent) = lookup("FOOTIE_GEOCODER_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent.trim().to_string();
        }
        if let Some(raw) = lookup("FOOTIE_GEOCODER_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().ok().filter(|&secs| secs > 0).ok_or_else(|| {
                GeocodeError::Client(format!(
                    "FOOTIE_GEOCODER_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
                    raw
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

// =============================================================================
// Nominatim client
// =============================================================================

/// One place in a Nominatim `/search` response
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim `/search` client
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Build a client; HTTPS-only unless the base URL is explicitly `http://`.
    pub fn new(config: GeocoderConfig) -> GeocodeResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let https_only = if base_url.starts_with("https://") {
            true
        } else if base_url.starts_with("http://") {
            false
        } else {
            return Err(GeocodeError::Client(format!("unsupported geocoder URL '{}'", base_url)));
        };

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .https_only(https_only)
            .build()
            .map_err(|e| GeocodeError::Client(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Create a client from environment settings
    pub fn from_env() -> GeocodeResult<Self> {
        Self::new(GeocoderConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> GeocodeResult<Option<Coordinates>> {
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_places(&body)
    }
}

/// Decode a `/search` body into the first place's coordinates.
fn parse_places(body: &str) -> GeocodeResult<Option<Coordinates>> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    let Some(place) = places.first() else {
        return Ok(None);
    };

    let lat = parse_degrees(&place.lat)?;
    let lon = parse_degrees(&place.lon)?;
    Ok(Some(Coordinates::new(lat, lon)))
}

fn parse_degrees(raw: &str) -> GeocodeResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeocodeError::InvalidResponse(format!("bad coordinate '{}'", raw)))
}
