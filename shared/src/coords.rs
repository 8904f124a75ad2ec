use serde::{Deserialize, Serialize};

/// Geographic position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Center of India, used as the initial map view.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 20.5937,
    lng: 78.9629,
};

impl Coordinate {
    /// Checked constructor. Rejects non-finite values and anything outside
    /// [-90, 90] x [-180, 180].
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }

    /// Normalize a position reported by a map widget. Tile maps happily report
    /// longitudes from neighbouring world copies (e.g. 437.2), so longitude is
    /// wrapped back into [-180, 180] and latitude is clamped.
    pub fn wrapped(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        let lat = lat.clamp(-90.0, 90.0);
        let lng = if (-180.0..=180.0).contains(&lng) {
            lng
        } else {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        };
        Some(Self { lat, lng })
    }

    /// Parse a pair of decimal strings, as returned by Nominatim.
    pub fn parse(lat: &str, lng: &str) -> Option<Self> {
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;
        Self::new(lat, lng)
    }

    /// Text written into the latitude/longitude inputs (6 decimal places).
    pub fn field_values(&self) -> (String, String) {
        (format!("{:.6}", self.lat), format!("{:.6}", self.lng))
    }

    /// `[lat, lng]` array form accepted by Leaflet.
    pub fn as_pair(&self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

/// Plain-data location shapes a map widget may hand back: a `[lat, lng]`
/// array or a `{ lat, lng }` object.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Pair([f64; 2]),
    Literal { lat: f64, lng: f64 },
}

impl LocationInput {
    pub fn to_coordinate(self) -> Option<Coordinate> {
        match self {
            Self::Pair([lat, lng]) | Self::Literal { lat, lng } => Coordinate::wrapped(lat, lng),
        }
    }
}

impl From<Coordinate> for LocationInput {
    fn from(c: Coordinate) -> Self {
        Self::Literal {
            lat: c.lat,
            lng: c.lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert!(Coordinate::new(91.0, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.5).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(90.0, 180.0).is_some());
    }

    #[test]
    fn field_values_use_six_decimals() {
        let c = Coordinate::new(28.6139, 77.2090).unwrap();
        assert_eq!(
            c.field_values(),
            ("28.613900".to_string(), "77.209000".to_string())
        );
    }

    #[test]
    fn wraps_world_copy_longitudes() {
        let c = Coordinate::wrapped(12.0, 437.5).unwrap();
        assert!((c.lng - 77.5).abs() < 1e-9);
        let c = Coordinate::wrapped(-95.0, -200.0).unwrap();
        assert_eq!(c.lat, -90.0);
        assert!((c.lng - 160.0).abs() < 1e-9);
    }

    #[test]
    fn parses_string_pairs() {
        let c = Coordinate::parse(" 19.0760", "72.8777").unwrap();
        assert_eq!(c.as_pair(), [19.076, 72.8777]);
        assert!(Coordinate::parse("north", "72.8").is_none());
    }

    #[test]
    fn location_input_accepts_both_shapes() {
        let pair: LocationInput = serde_json::from_value(json!([28.6, 77.2])).unwrap();
        let literal: LocationInput =
            serde_json::from_value(json!({ "lat": 28.6, "lng": 77.2 })).unwrap();
        assert_eq!(pair.to_coordinate(), literal.to_coordinate());
        assert_eq!(
            LocationInput::from(DEFAULT_CENTER).to_coordinate(),
            Some(DEFAULT_CENTER)
        );
    }
}
