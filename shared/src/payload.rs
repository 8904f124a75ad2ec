//! Prediction request assembly.
//!
//! Raw form entries go through collect → coerce → validate → derive aliases →
//! reorder, producing a [`PredictionRequest`] whose JSON key order matches the
//! column order the model's preprocessor was fitted with.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const POSTED_BY: &str = "POSTED_BY";
pub const UNDER_CONSTRUCTION: &str = "UNDER_CONSTRUCTION";
pub const RERA: &str = "RERA";
pub const BHK_NO: &str = "BHK_NO.";
pub const BHK_OR_RK: &str = "BHK_OR_RK";
pub const SQUARE_FT: &str = "SQUARE_FT";
pub const READY_TO_MOVE: &str = "READY_TO_MOVE";
pub const RESALE: &str = "RESALE";
pub const ADDRESS: &str = "ADDRESS";
pub const LONGITUDE: &str = "LONGITUDE";
pub const LATITUDE: &str = "LATITUDE";
pub const AREA: &str = "area";
pub const BEDROOMS: &str = "bedrooms";
pub const LONGITUDE_ALIAS: &str = "longitude";
pub const LATITUDE_ALIAS: &str = "latitude";
pub const CITY_NAME: &str = "CITY_NAME";

/// Checkbox fields. Unchecked boxes are absent from form data entirely.
pub const FLAG_FIELDS: [&str; 4] = [UNDER_CONSTRUCTION, RERA, READY_TO_MOVE, RESALE];

pub const NUMERIC_FIELDS: [&str; 4] = [BHK_NO, SQUARE_FT, LONGITUDE, LATITUDE];

pub const REQUIRED_FIELDS: [&str; 6] = [BHK_OR_RK, BHK_NO, SQUARE_FT, POSTED_BY, LONGITUDE, LATITUDE];

/// (alias, canonical) pairs; the alias is filled from the canonical field when unset.
pub const NUMERIC_ALIASES: [(&str, &str); 4] = [
    (AREA, SQUARE_FT),
    (BEDROOMS, BHK_NO),
    (LONGITUDE_ALIAS, LONGITUDE),
    (LATITUDE_ALIAS, LATITUDE),
];

pub const UNKNOWN_CITY: &str = "Unknown";

/// Column order expected by the server-side preprocessor.
pub const FIELD_ORDER: [&str; 16] = [
    POSTED_BY,
    UNDER_CONSTRUCTION,
    RERA,
    BHK_NO,
    BHK_OR_RK,
    SQUARE_FT,
    READY_TO_MOVE,
    RESALE,
    ADDRESS,
    LONGITUDE,
    LATITUDE,
    AREA,
    BEDROOMS,
    LONGITUDE_ALIAS,
    LATITUDE_ALIAS,
    CITY_NAME,
];

/// A single scalar in the request body.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(u8),
    Number(f64),
}

impl FieldValue {
    /// Whether the value counts as "filled in": non-empty text, non-zero number.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Flag(f) => *f != 0,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Flag(f) => Some(f64::from(*f)),
            Self::Text(_) => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Flag(f) => serializer.serialize_u8(*f),
            Self::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

/// Checkbox value → 0/1. Browsers submit `on` for value-less checkboxes.
pub fn flag_value(raw: &str) -> u8 {
    match raw {
        "1" | "on" => 1,
        _ => 0,
    }
}

/// Lenient float parse; anything unparseable or non-finite becomes 0.
pub fn numeric_value(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Required fields were left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Please fill in all required fields (marked with *)")
    }
}

impl std::error::Error for ValidationError {}

/// Insertion-ordered field map. Re-setting a key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    entries: Vec<(String, FieldValue)>,
}

impl FormFields {
    /// Collect and coerce raw form entries. Flags are defaulted to 0 before
    /// reading so unchecked boxes still appear in the result.
    pub fn collect<I, K, V>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut fields = Self::default();
        for flag in FLAG_FIELDS {
            fields.set(flag, FieldValue::Flag(0));
        }

        for (key, value) in raw {
            let key = key.into();
            let value = value.as_ref();
            let coerced = if FLAG_FIELDS.contains(&key.as_str()) {
                FieldValue::Flag(flag_value(value))
            } else if NUMERIC_FIELDS.contains(&key.as_str()) {
                FieldValue::Number(numeric_value(value))
            } else {
                FieldValue::Text(value.to_string())
            };
            fields.set(key, coerced);
        }
        fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(FieldValue::is_set)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .into_iter()
            .filter(|key| !self.is_set(key))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Fill alias columns the model also expects from their canonical fields.
    pub fn derive_aliases(&mut self) {
        for (alias, canonical) in NUMERIC_ALIASES {
            if self.is_set(alias) {
                continue;
            }
            let value = self
                .get(canonical)
                .cloned()
                .unwrap_or(FieldValue::Number(0.0));
            self.set(alias, value);
        }

        if !self.is_set(CITY_NAME) {
            let city = self
                .get(ADDRESS)
                .and_then(FieldValue::as_text)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_CITY)
                .to_string();
            self.set(CITY_NAME, FieldValue::Text(city));
        }
    }

    /// Reorder into [`FIELD_ORDER`], with unknown keys appended in collection order.
    pub fn into_ordered(self) -> PredictionRequest {
        let mut remaining = self.entries;
        let mut ordered = Vec::with_capacity(remaining.len());
        for key in FIELD_ORDER {
            if let Some(pos) = remaining.iter().position(|(k, _)| k == key) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.extend(remaining);
        PredictionRequest { entries: ordered }
    }
}

/// Request body for `POST /predict`. Serializes as a JSON object in entry order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    entries: Vec<(String, FieldValue)>,
}

impl PredictionRequest {
    /// Run the full pipeline over raw form entries.
    pub fn from_form<I, K, V>(raw: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut fields = FormFields::collect(raw);
        fields.validate()?;
        fields.derive_aliases();
        Ok(fields.into_ordered())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PredictionRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> Vec<(&'static str, &'static str)> {
        vec![
            ("POSTED_BY", "Owner"),
            ("BHK_NO.", "2"),
            ("BHK_OR_RK", "BHK"),
            ("SQUARE_FT", "1200"),
            ("RERA", "1"),
            ("ADDRESS", "Connaught Place, New Delhi"),
            ("LATITUDE", "28.613900"),
            ("LONGITUDE", "77.209000"),
        ]
    }

    #[test]
    fn unchecked_flags_are_present_as_zero() {
        let request = PredictionRequest::from_form(complete_form()).unwrap();
        for flag in FLAG_FIELDS {
            let expected = if flag == RERA { 1 } else { 0 };
            assert_eq!(request.get(flag), Some(&FieldValue::Flag(expected)), "{flag}");
        }
    }

    #[test]
    fn flag_values_accept_on_and_one_only() {
        let fields = FormFields::collect([
            ("RESALE", "on"),
            ("RERA", "1"),
            ("READY_TO_MOVE", "yes"),
        ]);
        assert_eq!(fields.get(RESALE), Some(&FieldValue::Flag(1)));
        assert_eq!(fields.get(RERA), Some(&FieldValue::Flag(1)));
        assert_eq!(fields.get(READY_TO_MOVE), Some(&FieldValue::Flag(0)));
        assert_eq!(fields.get(UNDER_CONSTRUCTION), Some(&FieldValue::Flag(0)));
    }

    #[test]
    fn numeric_fields_default_to_zero_when_unparseable() {
        let fields = FormFields::collect([("SQUARE_FT", "large"), ("BHK_NO.", " 3 ")]);
        assert_eq!(fields.get(SQUARE_FT), Some(&FieldValue::Number(0.0)));
        assert_eq!(fields.get(BHK_NO), Some(&FieldValue::Number(3.0)));
        assert_eq!(numeric_value("inf"), 0.0);
    }

    #[test]
    fn key_order_matches_expected_columns() {
        let request = PredictionRequest::from_form(complete_form()).unwrap();
        let keys: Vec<&str> = request.keys().collect();
        assert_eq!(keys, FIELD_ORDER.to_vec());

        let json = serde_json::to_string(&request).unwrap();
        let positions: Vec<usize> = FIELD_ORDER
            .iter()
            .map(|key| json.find(&format!("\"{key}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn extra_keys_follow_expected_columns() {
        let mut form = complete_form();
        form.insert(0, ("source", "web"));
        form.push(("campaign", "spring"));
        let request = PredictionRequest::from_form(form).unwrap();
        let keys: Vec<&str> = request.keys().collect();
        assert_eq!(&keys[..FIELD_ORDER.len()], &FIELD_ORDER[..]);
        assert_eq!(&keys[FIELD_ORDER.len()..], &["source", "campaign"]);
    }

    #[test]
    fn derives_aliases_from_canonical_fields() {
        let request = PredictionRequest::from_form(complete_form()).unwrap();
        assert_eq!(request.get(AREA), Some(&FieldValue::Number(1200.0)));
        assert_eq!(request.get(BEDROOMS), Some(&FieldValue::Number(2.0)));
        assert_eq!(request.get(LATITUDE_ALIAS), Some(&FieldValue::Number(28.6139)));
        assert_eq!(request.get(LONGITUDE_ALIAS), Some(&FieldValue::Number(77.209)));
        assert_eq!(
            request.get(CITY_NAME),
            Some(&FieldValue::Text("Connaught Place, New Delhi".into()))
        );
    }

    #[test]
    fn supplied_aliases_are_kept() {
        let mut form = complete_form();
        form.push(("area", "950"));
        form.push(("CITY_NAME", "Delhi"));
        let request = PredictionRequest::from_form(form).unwrap();
        assert_eq!(request.get(AREA), Some(&FieldValue::Text("950".into())));
        assert_eq!(request.get(CITY_NAME), Some(&FieldValue::Text("Delhi".into())));
    }

    #[test]
    fn city_falls_back_to_unknown() {
        let form: Vec<_> = complete_form()
            .into_iter()
            .filter(|(k, _)| *k != "ADDRESS")
            .collect();
        let request = PredictionRequest::from_form(form).unwrap();
        assert_eq!(request.get(CITY_NAME), Some(&FieldValue::Text("Unknown".into())));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let form: Vec<_> = complete_form()
            .into_iter()
            .filter(|(k, _)| *k != "POSTED_BY")
            .collect();
        let err = PredictionRequest::from_form(form).unwrap_err();
        assert_eq!(err.missing, vec![POSTED_BY]);
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields (marked with *)"
        );
    }

    #[test]
    fn zero_coordinates_count_as_missing() {
        let mut form = complete_form();
        form.retain(|(k, _)| *k != "LATITUDE");
        form.push(("LATITUDE", "0"));
        let err = PredictionRequest::from_form(form).unwrap_err();
        assert_eq!(err.missing, vec![LATITUDE]);
    }

    #[test]
    fn serializes_scalars_by_kind() {
        let request = PredictionRequest::from_form(complete_form()).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["RERA"], serde_json::json!(1));
        assert_eq!(value["SQUARE_FT"], serde_json::json!(1200.0));
        assert_eq!(value["POSTED_BY"], serde_json::json!("Owner"));
    }
}
