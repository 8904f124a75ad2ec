//! Commercial backend: Google Maps JavaScript API (maps + geocoder + places).

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use house_price_shared::Coordinate;

use super::location;
use crate::config::DEFAULT_ZOOM;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = "Map")]
    pub type GoogleMap;
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = "Marker")]
    pub type GoogleMarker;
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = "Geocoder")]
    pub type GoogleGeocoder;
    #[wasm_bindgen(js_namespace = ["google", "maps", "places"], js_name = "Autocomplete")]
    pub type GoogleAutocomplete;

    #[wasm_bindgen(catch, constructor, js_namespace = ["google", "maps"], js_class = "Map")]
    fn new_map(container: &web_sys::Element, options: &JsValue) -> Result<GoogleMap, JsValue>;

    #[wasm_bindgen(catch, constructor, js_namespace = ["google", "maps"], js_class = "Marker")]
    fn new_marker(options: &JsValue) -> Result<GoogleMarker, JsValue>;

    #[wasm_bindgen(catch, constructor, js_namespace = ["google", "maps"], js_class = "Geocoder")]
    fn new_geocoder() -> Result<GoogleGeocoder, JsValue>;

    #[wasm_bindgen(catch, constructor, js_namespace = ["google", "maps", "places"], js_class = "Autocomplete")]
    fn new_autocomplete(
        input: &web_sys::HtmlInputElement,
        options: &JsValue,
    ) -> Result<GoogleAutocomplete, JsValue>;

    #[wasm_bindgen(method, js_name = setCenter)]
    fn set_center(this: &GoogleMap, at: &JsValue);

    #[wasm_bindgen(method, js_name = setZoom)]
    fn set_zoom(this: &GoogleMap, zoom: f64);

    #[wasm_bindgen(method, js_name = addListener)]
    fn add_map_listener(this: &GoogleMap, event: &str, handler: &Function) -> JsValue;

    #[wasm_bindgen(method, js_name = setPosition)]
    fn set_position(this: &GoogleMarker, at: &JsValue);

    #[wasm_bindgen(method, js_name = addListener)]
    fn add_marker_listener(this: &GoogleMarker, event: &str, handler: &Function) -> JsValue;

    #[wasm_bindgen(method)]
    fn geocode(this: &GoogleGeocoder, request: &JsValue, callback: &JsValue);

    #[wasm_bindgen(method, js_name = addListener)]
    fn add_autocomplete_listener(
        this: &GoogleAutocomplete,
        event: &str,
        handler: &Function,
    ) -> JsValue;

    #[wasm_bindgen(method, js_name = getPlace)]
    fn get_place(this: &GoogleAutocomplete) -> JsValue;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    feature_type: Option<&'static str>,
    element_type: &'static str,
    stylers: [Styler; 1],
}

#[derive(Serialize)]
struct Styler {
    color: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions {
    center: Coordinate,
    zoom: f64,
    styles: Vec<MapStyle>,
    map_type_control: bool,
    street_view_control: bool,
    fullscreen_control: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SymbolIcon {
    // google.maps.SymbolPath.CIRCLE
    path: u8,
    scale: f64,
    fill_color: &'static str,
    fill_opacity: f64,
    stroke_color: &'static str,
    stroke_weight: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComponentRestrictions {
    country: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AutocompleteOptions {
    types: [&'static str; 2],
    component_restrictions: ComponentRestrictions,
}

/// (featureType, elementType, color)
const DARK_STYLES: &[(&str, &str, &str)] = &[
    ("all", "geometry", "#1a1a2e"),
    ("all", "labels.text.fill", "#00f5ff"),
    ("water", "geometry", "#0a0e27"),
    ("road", "geometry", "#1a1a2e"),
];

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(value).map_err(|e| format!("options error: {e}"))
}

/// Live Google map, draggable marker and built-in geocoder.
pub struct GoogleBackend {
    map: GoogleMap,
    marker: GoogleMarker,
    geocoder: GoogleGeocoder,
}

impl GoogleBackend {
    pub fn create(container: &web_sys::Element, center: Coordinate) -> Result<Self, String> {
        let styles = DARK_STYLES
            .iter()
            .map(|&(feature, element, color)| MapStyle {
                feature_type: Some(feature),
                element_type: element,
                stylers: [Styler { color }],
            })
            .collect();
        let options = to_js(&MapOptions {
            center,
            zoom: DEFAULT_ZOOM,
            styles,
            map_type_control: false,
            street_view_control: false,
            fullscreen_control: true,
        })?;
        let map = GoogleMap::new_map(container, &options)
            .map_err(|e| format!("google.maps.Map failed: {e:?}"))?;
        let geocoder = GoogleGeocoder::new_geocoder()
            .map_err(|e| format!("google.maps.Geocoder failed: {e:?}"))?;

        let marker_options = to_js(&SymbolIcon {
            path: 0,
            scale: 10.0,
            fill_color: "#00f5ff",
            fill_opacity: 1.0,
            stroke_color: "#7b2ff7",
            stroke_weight: 3.0,
        })
        .and_then(|icon| {
            let options = js_sys::Object::new();
            Reflect::set(&options, &"map".into(), &map)
                .and_then(|_| Reflect::set(&options, &"draggable".into(), &JsValue::TRUE))
                .and_then(|_| Reflect::set(&options, &"icon".into(), &icon))
                .map_err(|e| format!("marker options: {e:?}"))?;
            Ok(JsValue::from(options))
        })?;
        let marker = GoogleMarker::new_marker(&marker_options)
            .map_err(|e| format!("google.maps.Marker failed: {e:?}"))?;

        Ok(Self {
            map,
            marker,
            geocoder,
        })
    }

    pub fn move_marker(&self, at: Coordinate, zoom: f64) {
        let literal = location::to_literal(at);
        self.marker.set_position(&literal);
        self.map.set_center(&literal);
        self.map.set_zoom(zoom);
    }

    pub fn on_map_click(&self, handler: &Function) {
        self.map.add_map_listener("click", handler);
    }

    pub fn on_marker_dragend(&self, handler: &Function) {
        self.marker.add_marker_listener("dragend", handler);
    }

    /// Reverse geocode through the built-in geocoder. `done` receives the
    /// formatted address of the first result, or `None` on any failure.
    pub fn reverse_geocode(&self, at: Coordinate, done: impl FnOnce(Option<String>) + 'static) {
        let request = js_sys::Object::new();
        if Reflect::set(&request, &"location".into(), &location::to_literal(at)).is_err() {
            done(None);
            return;
        }
        let callback = Closure::once_into_js(move |results: JsValue, status: JsValue| {
            done(first_formatted_address(&results, &status));
        });
        self.geocoder.geocode(&request, &callback);
    }
}

fn first_formatted_address(results: &JsValue, status: &JsValue) -> Option<String> {
    if status.as_string().as_deref() != Some("OK") {
        return None;
    }
    let first = results.dyn_ref::<Array>()?.get(0);
    location::property_path(&first, &["formatted_address"])?.as_string()
}

/// Places autocomplete bound to the address input.
pub struct PlaceSearch {
    autocomplete: GoogleAutocomplete,
}

impl PlaceSearch {
    pub fn attach(input: &web_sys::HtmlInputElement) -> Result<Self, String> {
        let options = to_js(&AutocompleteOptions {
            types: ["geocode", "establishment"],
            component_restrictions: ComponentRestrictions { country: "in" },
        })?;
        let autocomplete = GoogleAutocomplete::new_autocomplete(input, &options)
            .map_err(|e| format!("google.maps.places.Autocomplete failed: {e:?}"))?;
        Ok(Self { autocomplete })
    }

    pub fn on_place_changed(&self, handler: &Function) {
        self.autocomplete.add_autocomplete_listener("place_changed", handler);
    }

    /// `place.geometry.location` of the current selection, if it has geometry.
    pub fn selected_location(&self) -> Option<JsValue> {
        location::property_path(&self.autocomplete.get_place(), &["geometry", "location"])
    }
}
