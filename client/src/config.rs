use js_sys::Reflect;
use wasm_bindgen::JsValue;

pub const PREDICT_PATH: &str = "/predict";
pub const HEALTH_PATH: &str = "/health";

pub const APP_ROOT_ID: &str = "app";
pub const MAP_CONTAINER_ID: &str = "map";
pub const ADDRESS_INPUT_ID: &str = "address";

pub const DEFAULT_ZOOM: f64 = 5.0;
pub const FOCUS_ZOOM: f64 = 15.0;
pub const TILE_MAX_ZOOM: u8 = 19;

/// How long to wait for the commercial map script before falling back.
pub const MAP_INIT_FALLBACK_MS: u32 = 1_000;
pub const COUNT_UP_DURATION_MS: f64 = 1_000.0;
pub const RESULT_REVEAL_DELAY_MS: u32 = 300;
pub const LANDING_EXIT_MS: u32 = 500;
pub const LANDING_PARTICLES: usize = 10;

/// Value shipped in the page template until a real key is configured.
pub const PLACEHOLDER_MAPS_KEY: &str = "YOUR_API_KEY";
const MAPS_KEY_GLOBAL: &str = "google_maps_key";

pub fn is_usable_maps_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_MAPS_KEY
}

/// Commercial map credential from `window.google_maps_key`, if usable.
pub fn google_maps_key() -> Option<String> {
    let window = web_sys::window()?;
    Reflect::get(window.as_ref(), &JsValue::from_str(MAPS_KEY_GLOBAL))
        .ok()
        .and_then(|v| v.as_string())
        .filter(|k| is_usable_maps_key(k))
}

fn global_path_defined(path: &[&str]) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let mut cursor: JsValue = window.into();
    for segment in path {
        let Ok(next) = Reflect::get(&cursor, &JsValue::from_str(segment)) else {
            return false;
        };
        if next.is_undefined() || next.is_null() {
            return false;
        }
        cursor = next;
    }
    true
}

/// `window.google.maps` is present.
pub fn google_maps_loaded() -> bool {
    global_path_defined(&["google", "maps"])
}

/// `window.google.maps.places` is present (Places library requested).
pub fn google_places_loaded() -> bool {
    global_path_defined(&["google", "maps", "places"])
}

/// Leaflet's global `L` is present.
pub fn leaflet_loaded() -> bool {
    global_path_defined(&["L"])
}

/// Origin the page was served from; the prediction API lives there too.
pub fn api_base_url() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_blank_keys_are_unusable() {
        assert!(!is_usable_maps_key(PLACEHOLDER_MAPS_KEY));
        assert!(!is_usable_maps_key("  "));
        assert!(is_usable_maps_key("AIzaSyExample"));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://localhost:5000/", PREDICT_PATH),
            "http://localhost:5000/predict"
        );
        assert_eq!(endpoint("", HEALTH_PATH), "/health");
    }
}
