use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use house_price_shared::{Coordinate, LocationInput};

/// Normalize any backend's native location to a [`Coordinate`].
///
/// Accepts a `[lat, lng]` array, a `{ lat, lng }` object with numeric fields
/// (Leaflet `LatLng`, literals), or a Google `LatLng` whose `lat`/`lng` are methods.
pub fn to_coordinate(value: &JsValue) -> Option<Coordinate> {
    if let Some(c) = accessor_location(value) {
        return Some(c);
    }
    serde_wasm_bindgen::from_value::<LocationInput>(value.clone())
        .ok()
        .and_then(LocationInput::to_coordinate)
}

fn accessor_location(value: &JsValue) -> Option<Coordinate> {
    if !value.is_object() {
        return None;
    }
    let lat = call_accessor(value, "lat")?;
    let lng = call_accessor(value, "lng")?;
    Coordinate::wrapped(lat, lng)
}

fn call_accessor(target: &JsValue, name: &str) -> Option<f64> {
    let f = Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    f.call0(target).ok()?.as_f64()
}

/// `{ lat, lng }` literal accepted by both backends' setters.
pub fn to_literal(c: Coordinate) -> JsValue {
    serde_wasm_bindgen::to_value(&c).unwrap_or(JsValue::UNDEFINED)
}

/// `[lat, lng]` array as Leaflet prefers.
pub fn to_pair(c: Coordinate) -> JsValue {
    serde_wasm_bindgen::to_value(&c.as_pair()).unwrap_or(JsValue::UNDEFINED)
}

/// Read a nested property chain, e.g. `event.latlng` or `place.geometry.location`.
pub fn property_path(root: &JsValue, path: &[&str]) -> Option<JsValue> {
    let mut cursor = root.clone();
    for segment in path {
        let next = Reflect::get(&cursor, &JsValue::from_str(segment)).ok()?;
        if next.is_undefined() || next.is_null() {
            return None;
        }
        cursor = next;
    }
    Some(cursor)
}
