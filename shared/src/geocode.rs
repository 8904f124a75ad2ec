//! Nominatim request/response contract used by the free map backend.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::coords::Coordinate;

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
pub const SEARCH_COUNTRY_CODES: &str = "in";
pub const SEARCH_RESULT_LIMIT: u32 = 5;
pub const REVERSE_ZOOM: u32 = 18;

/// Address-search debounce: fire once typing pauses for `debounce_ms`, and
/// only for queries of at least `min_chars` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPolicy {
    pub min_chars: usize,
    pub debounce_ms: u32,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            min_chars: 3,
            debounce_ms: 500,
        }
    }
}

impl SearchPolicy {
    pub fn accepts(&self, query: &str) -> bool {
        query.chars().count() >= self.min_chars
    }
}

pub fn search_url(query: &str) -> Result<Url, url::ParseError> {
    let limit = SEARCH_RESULT_LIMIT.to_string();
    Url::parse_with_params(
        NOMINATIM_SEARCH_URL,
        &[
            ("format", "json"),
            ("q", query),
            ("limit", limit.as_str()),
            ("countrycodes", SEARCH_COUNTRY_CODES),
        ],
    )
}

pub fn reverse_url(at: Coordinate) -> Result<Url, url::ParseError> {
    let lat = at.lat.to_string();
    let lon = at.lng.to_string();
    let zoom = REVERSE_ZOOM.to_string();
    Url::parse_with_params(
        NOMINATIM_REVERSE_URL,
        &[
            ("format", "json"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("zoom", zoom.as_str()),
            ("addressdetails", "1"),
        ],
    )
}

/// One `/search` result. Nominatim encodes coordinates as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

impl SearchHit {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::parse(&self.lat, &self.lon)
    }
}

/// Position of the best (first) search result, if it parses.
pub fn best_match(hits: &[SearchHit]) -> Option<Coordinate> {
    hits.first().and_then(SearchHit::coordinate)
}

/// `/reverse` response; only the display name is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseHit {
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ReverseHit {
    pub fn address(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|s| !s.trim().is_empty())
    }
}
