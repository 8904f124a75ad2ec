//! Free backend: Leaflet over OpenStreetMap / CARTO tiles.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use house_price_shared::Coordinate;

use super::location;
use crate::config::{DEFAULT_ZOOM, TILE_MAX_ZOOM};

#[wasm_bindgen]
extern "C" {
    pub type LeafletMap;
    pub type LeafletMarker;
    pub type LeafletLayer;
    pub type LeafletIcon;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn l_map(container_id: &str, options: &JsValue) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    fn l_tile_layer(url_template: &str, options: &JsValue) -> Result<LeafletLayer, JsValue>;

    #[wasm_bindgen(catch, js_namespace = L, js_name = marker)]
    fn l_marker(at: &JsValue, options: &JsValue) -> Result<LeafletMarker, JsValue>;

    #[wasm_bindgen(catch, js_namespace = L, js_name = divIcon)]
    fn l_div_icon(options: &JsValue) -> Result<LeafletIcon, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64) -> LeafletMap;

    #[wasm_bindgen(method, js_name = on)]
    fn on_map(this: &LeafletMap, event: &str, handler: &js_sys::Function) -> LeafletMap;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_layer_to(this: &LeafletLayer, map: &LeafletMap) -> LeafletLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_marker_to(this: &LeafletMarker, map: &LeafletMap) -> LeafletMarker;

    #[wasm_bindgen(method, js_name = setLatLng)]
    fn set_lat_lng(this: &LeafletMarker, at: &JsValue) -> LeafletMarker;

    #[wasm_bindgen(method, js_name = getLatLng)]
    fn get_lat_lng(this: &LeafletMarker) -> JsValue;

    #[wasm_bindgen(method, js_name = on)]
    fn on_marker(this: &LeafletMarker, event: &str, handler: &js_sys::Function) -> LeafletMarker;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions {
    center: [f64; 2],
    zoom: f64,
    zoom_control: bool,
    attribution_control: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions {
    attribution: &'static str,
    max_zoom: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    subdomains: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IconOptions {
    class_name: &'static str,
    html: &'static str,
    icon_size: [u32; 2],
    icon_anchor: [u32; 2],
}

#[derive(Serialize)]
struct MarkerOptions {
    draggable: bool,
}

/// (url template, attribution, subdomains). Later layers draw on top.
const TILE_LAYERS: &[(&str, &str, Option<&str>)] = &[
    (
        "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        "© OpenStreetMap contributors",
        None,
    ),
    (
        "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
        "© OpenStreetMap contributors, © CARTO",
        Some("abcd"),
    ),
];

const MARKER_HTML: &str = "<div style=\"background: linear-gradient(135deg, #00f5ff, #7b2ff7); width: 30px; height: 30px; border-radius: 50%; border: 3px solid white; box-shadow: 0 0 20px rgba(0, 245, 255, 0.8);\"></div>";

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(value).map_err(|e| format!("options error: {e}"))
}

/// Live Leaflet map plus its single draggable marker.
pub struct LeafletBackend {
    map: LeafletMap,
    marker: LeafletMarker,
}

impl LeafletBackend {
    pub fn create(container_id: &str, center: Coordinate) -> Result<Self, String> {
        let options = to_js(&MapOptions {
            center: center.as_pair(),
            zoom: DEFAULT_ZOOM,
            zoom_control: true,
            attribution_control: true,
        })?;
        let map = l_map(container_id, &options).map_err(|e| format!("L.map failed: {e:?}"))?;

        for &(url, attribution, subdomains) in TILE_LAYERS {
            let options = to_js(&TileOptions {
                attribution,
                max_zoom: TILE_MAX_ZOOM,
                subdomains,
            })?;
            match l_tile_layer(url, &options) {
                Ok(layer) => {
                    layer.add_layer_to(&map);
                }
                Err(e) => {
                    web_sys::console::warn_1(&format!("Tile layer {url} failed: {e:?}").into());
                }
            }
        }

        let icon = l_div_icon(&to_js(&IconOptions {
            class_name: "custom-marker",
            html: MARKER_HTML,
            icon_size: [30, 30],
            icon_anchor: [15, 15],
        })?)
        .map_err(|e| format!("L.divIcon failed: {e:?}"))?;

        // The icon is a live Leaflet object, so it is attached after serialization.
        let marker_options = to_js(&MarkerOptions { draggable: true })?;
        js_sys::Reflect::set(&marker_options, &JsValue::from_str("icon"), &icon)
            .map_err(|e| format!("marker options: {e:?}"))?;
        let marker = l_marker(&location::to_pair(center), &marker_options)
            .map_err(|e| format!("L.marker failed: {e:?}"))?;
        marker.add_marker_to(&map);

        Ok(Self { map, marker })
    }

    pub fn move_marker(&self, at: Coordinate, zoom: f64) {
        let pair = location::to_pair(at);
        self.marker.set_lat_lng(&pair);
        self.map.set_view(&pair, zoom);
    }

    pub fn marker_position(&self) -> Option<Coordinate> {
        location::to_coordinate(&self.marker.get_lat_lng())
    }

    pub fn on_map_click(&self, handler: &js_sys::Function) {
        self.map.on_map("click", handler);
    }

    pub fn on_marker_dragend(&self, handler: &js_sys::Function) {
        self.marker.on_marker("dragend", handler);
    }
}
