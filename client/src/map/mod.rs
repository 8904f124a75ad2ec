//! Map adapter: one controller over either the Google or the Leaflet backend.
//!
//! The backend is chosen once per page load. Callers only ever talk to
//! [`MapAdapter`], which keeps the coordinate and address fields in sync with
//! the marker and owns every JS callback it registers.

mod google;
mod leaflet;
mod location;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use js_sys::{Function, Reflect};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use house_price_shared::geocode::SearchPolicy;
use house_price_shared::{Coordinate, DEFAULT_CENTER};

use crate::config::{
    ADDRESS_INPUT_ID, FOCUS_ZOOM, MAP_CONTAINER_ID, MAP_INIT_FALLBACK_MS, google_maps_key,
    google_maps_loaded, google_places_loaded, is_usable_maps_key, leaflet_loaded,
};
use crate::geocode;

use google::{GoogleBackend, PlaceSearch};
use leaflet::LeafletBackend;

/// Global the Google loader script calls back into (`callback=initMap`).
const INIT_CALLBACK_GLOBAL: &str = "initMap";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Google,
    Leaflet,
    /// Neither library is on the page; coordinates can still be typed by hand.
    Unavailable,
}

/// Google only when its library is loaded and the page carries a real key.
pub fn select_backend(
    google_loaded: bool,
    maps_key: Option<&str>,
    leaflet_loaded: bool,
) -> BackendKind {
    let key_usable = maps_key.is_some_and(is_usable_maps_key);
    if google_loaded && key_usable {
        BackendKind::Google
    } else if leaflet_loaded {
        BackendKind::Leaflet
    } else {
        BackendKind::Unavailable
    }
}

/// Form fields the adapter writes into.
#[derive(Clone, Copy)]
pub struct CoordinateFields {
    pub latitude: RwSignal<String>,
    pub longitude: RwSignal<String>,
    pub address: RwSignal<String>,
}

enum ActiveBackend {
    Leaflet(LeafletBackend),
    Google {
        backend: GoogleBackend,
        places: Option<PlaceSearch>,
    },
}

impl ActiveBackend {
    fn kind(&self) -> BackendKind {
        match self {
            ActiveBackend::Leaflet(_) => BackendKind::Leaflet,
            ActiveBackend::Google { .. } => BackendKind::Google,
        }
    }

    fn move_marker(&self, at: Coordinate, zoom: f64) {
        match self {
            ActiveBackend::Leaflet(map) => map.move_marker(at, zoom),
            ActiveBackend::Google { backend, .. } => backend.move_marker(at, zoom),
        }
    }
}

struct Inner {
    fields: CoordinateFields,
    policy: SearchPolicy,
    backend: RefCell<Option<ActiveBackend>>,
    reverse_seq: Cell<u64>,
    search_seq: Cell<u64>,
    pending_search: RefCell<Option<Timeout>>,
    fallback: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
    init_callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

#[derive(Clone)]
pub struct MapAdapter {
    inner: Rc<Inner>,
}

impl MapAdapter {
    pub fn new(fields: CoordinateFields) -> Self {
        Self {
            inner: Rc::new(Inner {
                fields,
                policy: SearchPolicy::default(),
                backend: RefCell::new(None),
                reverse_seq: Cell::new(0),
                search_seq: Cell::new(0),
                pending_search: RefCell::new(None),
                fallback: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                init_callback: RefCell::new(None),
            }),
        }
    }

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.inner.backend.borrow().as_ref().map(ActiveBackend::kind)
    }

    /// Initialize now if Google is already loaded; otherwise expose
    /// `window.initMap` for the loader script and fall back after a delay.
    pub fn bootstrap(&self) {
        if google_maps_loaded() {
            self.initialize();
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(adapter) = MapAdapter::from_weak(&weak) {
                adapter.initialize();
            }
        });
        if Reflect::set(
            window.as_ref(),
            &JsValue::from_str(INIT_CALLBACK_GLOBAL),
            callback.as_ref().unchecked_ref(),
        )
        .is_err()
        {
            web_sys::console::warn_1(&"Could not export initMap callback".into());
        }
        *self.inner.init_callback.borrow_mut() = Some(callback);

        let weak = Rc::downgrade(&self.inner);
        let fallback = Timeout::new(MAP_INIT_FALLBACK_MS, move || {
            if let Some(adapter) = MapAdapter::from_weak(&weak) {
                adapter.initialize();
            }
        });
        *self.inner.fallback.borrow_mut() = Some(fallback);
    }

    /// Pick and construct a backend. Only the first successful call does
    /// anything; a call that finds no usable library leaves the adapter open
    /// for a later `initMap` or fallback attempt.
    pub fn initialize(&self) {
        if self.inner.backend.borrow().is_some() {
            return;
        }
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(container) = document.get_element_by_id(MAP_CONTAINER_ID) else {
            return;
        };

        let kind = select_backend(
            google_maps_loaded(),
            google_maps_key().as_deref(),
            leaflet_loaded(),
        );
        let google = || {
            let backend = GoogleBackend::create(&container, DEFAULT_CENTER)?;
            let places = document
                .get_element_by_id(ADDRESS_INPUT_ID)
                .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
                .filter(|_| google_places_loaded())
                .and_then(|input| match PlaceSearch::attach(&input) {
                    Ok(places) => Some(places),
                    Err(e) => {
                        web_sys::console::warn_1(&e.into());
                        None
                    }
                });
            Ok(ActiveBackend::Google { backend, places })
        };
        let leaflet = || {
            LeafletBackend::create(MAP_CONTAINER_ID, DEFAULT_CENTER).map(ActiveBackend::Leaflet)
        };

        let active = match construct_backend(kind, leaflet_loaded, google, leaflet) {
            Ok(active) => active,
            Err(e) => {
                web_sys::console::error_1(&format!("{e}; enter coordinates manually").into());
                return;
            }
        };
        self.bind_listeners(&active);
        *self.inner.backend.borrow_mut() = Some(active);
    }

    fn listener(&self, mut handler: impl FnMut(&MapAdapter, JsValue) + 'static) -> Function {
        let weak = Rc::downgrade(&self.inner);
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            if let Some(adapter) = MapAdapter::from_weak(&weak) {
                handler(&adapter, event);
            }
        });
        let function: Function = closure.as_ref().unchecked_ref::<Function>().clone();
        self.inner.listeners.borrow_mut().push(closure);
        function
    }

    fn bind_listeners(&self, active: &ActiveBackend) {
        match active {
            ActiveBackend::Leaflet(map) => {
                map.on_map_click(&self.listener(|adapter, event| {
                    if let Some(at) = location::property_path(&event, &["latlng"])
                        .and_then(|v| location::to_coordinate(&v))
                    {
                        adapter.on_user_relocate(at);
                    }
                }));
                map.on_marker_dragend(&self.listener(|adapter, _event| {
                    let position = match adapter.inner.backend.borrow().as_ref() {
                        Some(ActiveBackend::Leaflet(map)) => map.marker_position(),
                        _ => None,
                    };
                    if let Some(at) = position {
                        adapter.on_user_relocate(at);
                    }
                }));
            }
            ActiveBackend::Google { backend, places } => {
                let relocate = |adapter: &MapAdapter, event: JsValue| {
                    if let Some(at) = location::property_path(&event, &["latLng"])
                        .and_then(|v| location::to_coordinate(&v))
                    {
                        adapter.on_user_relocate(at);
                    }
                };
                backend.on_map_click(&self.listener(relocate));
                backend.on_marker_dragend(&self.listener(relocate));
                if let Some(places) = places {
                    places.on_place_changed(&self.listener(|adapter, _event| {
                        let selected = match adapter.inner.backend.borrow().as_ref() {
                            Some(ActiveBackend::Google {
                                places: Some(places),
                                ..
                            }) => places.selected_location(),
                            _ => None,
                        };
                        if let Some(native) = selected {
                            adapter.place_native(&native);
                        }
                    }));
                }
            }
        }
    }

    /// Move the marker, focus the map on it and sync the form fields.
    pub fn place_marker_at(&self, at: Coordinate) {
        let moved = match self.inner.backend.borrow().as_ref() {
            Some(active) => {
                active.move_marker(at, FOCUS_ZOOM);
                true
            }
            None => false,
        };
        if moved {
            self.sync_fields(at);
        }
    }

    /// [`place_marker_at`](Self::place_marker_at) for a backend-native location.
    pub fn place_native(&self, native: &JsValue) {
        match location::to_coordinate(native) {
            Some(at) => self.place_marker_at(at),
            None => web_sys::console::warn_1(&"Ignoring unreadable map location".into()),
        }
    }

    /// Explicit choice on the map; a pending typed search must not override it.
    pub fn on_user_relocate(&self, at: Coordinate) {
        self.cancel_pending_search();
        self.place_marker_at(at);
    }

    fn cancel_pending_search(&self) {
        self.inner.pending_search.borrow_mut().take();
        bump(&self.inner.search_seq);
    }

    fn sync_fields(&self, at: Coordinate) {
        let (lat, lng) = at.field_values();
        self.inner.fields.latitude.set(lat);
        self.inner.fields.longitude.set(lng);

        let seq = bump(&self.inner.reverse_seq);
        let weak = Rc::downgrade(&self.inner);
        let apply = move |address: Option<String>| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Some(address) = reverse_outcome(address, seq, inner.reverse_seq.get()) {
                inner.fields.address.set(address);
            }
        };

        match self.inner.backend.borrow().as_ref() {
            Some(ActiveBackend::Google { backend, .. }) => backend.reverse_geocode(at, apply),
            Some(ActiveBackend::Leaflet(_)) => spawn_local(async move {
                match geocode::reverse_lookup(at).await {
                    Ok(address) => apply(address),
                    Err(e) => {
                        web_sys::console::error_1(&format!("Reverse geocoding error: {e}").into());
                    }
                }
            }),
            None => {}
        }
    }

    /// Typed address changed. On Leaflet this schedules a debounced
    /// Nominatim search; Google's Places widget handles its own input.
    pub fn on_address_input(&self, text: &str) {
        self.inner.pending_search.borrow_mut().take();
        if self.backend_kind() != Some(BackendKind::Leaflet) {
            return;
        }
        if !self.inner.policy.accepts(text) {
            return;
        }

        let query = text.to_owned();
        let weak = Rc::downgrade(&self.inner);
        let timeout = Timeout::new(self.inner.policy.debounce_ms, move || {
            if let Some(adapter) = MapAdapter::from_weak(&weak) {
                adapter.run_search(query);
            }
        });
        *self.inner.pending_search.borrow_mut() = Some(timeout);
    }

    fn run_search(&self, query: String) {
        let seq = bump(&self.inner.search_seq);
        let weak = Rc::downgrade(&self.inner);
        spawn_local(async move {
            let result = geocode::search_address(&query).await;
            let Some(adapter) = MapAdapter::from_weak(&weak) else {
                return;
            };
            if let Err(e) = &result {
                web_sys::console::error_1(&format!("Geocoding error: {e}").into());
            }
            if let Some(at) = search_outcome(result, seq, adapter.inner.search_seq.get()) {
                adapter.place_marker_at(at);
            }
        });
    }
}

/// Build the selected backend, falling back from Google to Leaflet when the
/// Google constructors fail. `Err` carries every failure, for the console.
fn construct_backend<T>(
    kind: BackendKind,
    leaflet_loaded: impl Fn() -> bool,
    google: impl FnOnce() -> Result<T, String>,
    leaflet: impl FnOnce() -> Result<T, String>,
) -> Result<T, String> {
    let mut failures = Vec::new();
    let try_leaflet = match kind {
        BackendKind::Google => match google() {
            Ok(backend) => return Ok(backend),
            Err(e) => {
                failures.push(format!("Google map unavailable: {e}"));
                leaflet_loaded()
            }
        },
        BackendKind::Leaflet => true,
        BackendKind::Unavailable => false,
    };
    if try_leaflet {
        match leaflet() {
            Ok(backend) => return Ok(backend),
            Err(e) => failures.push(format!("Leaflet map unavailable: {e}")),
        }
    }
    if failures.is_empty() {
        failures.push("No map library loaded".to_string());
    }
    Err(failures.join("; "))
}

/// Forward-search result to apply, if any. Stale or failed lookups leave the
/// marker where it is.
fn search_outcome(
    result: Result<Option<Coordinate>, String>,
    seq: u64,
    current: u64,
) -> Option<Coordinate> {
    if seq != current {
        return None;
    }
    result.ok().flatten()
}

/// Reverse-lookup address to write, if any.
fn reverse_outcome(address: Option<String>, seq: u64, current: u64) -> Option<String> {
    if seq != current {
        return None;
    }
    address.filter(|a| !a.trim().is_empty())
}

fn bump(counter: &Cell<u64>) -> u64 {
    let next = counter.get().wrapping_add(1);
    counter.set(next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_needs_library_and_real_key() {
        assert_eq!(
            select_backend(true, Some("AIzaSyExample"), true),
            BackendKind::Google
        );
        assert_eq!(
            select_backend(true, Some("YOUR_API_KEY"), true),
            BackendKind::Leaflet
        );
        assert_eq!(select_backend(true, None, true), BackendKind::Leaflet);
        assert_eq!(
            select_backend(false, Some("AIzaSyExample"), true),
            BackendKind::Leaflet
        );
    }

    #[test]
    fn google_is_used_even_without_leaflet() {
        assert_eq!(
            select_backend(true, Some("AIzaSyExample"), false),
            BackendKind::Google
        );
    }

    #[test]
    fn nothing_loaded_is_unavailable() {
        assert_eq!(select_backend(false, None, false), BackendKind::Unavailable);
        assert_eq!(
            select_backend(true, Some(""), false),
            BackendKind::Unavailable
        );
    }

    #[test]
    fn google_failure_falls_back_to_leaflet() {
        let built = construct_backend(
            BackendKind::Google,
            || true,
            || Err::<&str, _>("quota".into()),
            || Ok("leaflet"),
        );
        assert_eq!(built, Ok("leaflet"));
    }

    #[test]
    fn google_failure_without_leaflet_is_an_error() {
        let built = construct_backend(
            BackendKind::Google,
            || false,
            || Err::<&str, _>("quota".into()),
            || Ok("leaflet"),
        );
        assert_eq!(built, Err("Google map unavailable: quota".to_string()));
    }

    #[test]
    fn unavailable_attempt_can_be_retried() {
        let first = construct_backend(
            BackendKind::Unavailable,
            || false,
            || Ok("google"),
            || Ok("leaflet"),
        );
        assert_eq!(first, Err("No map library loaded".to_string()));

        // Google arrives later through `initMap`.
        let second = construct_backend(
            BackendKind::Google,
            || false,
            || Ok("google"),
            || Ok("leaflet"),
        );
        assert_eq!(second, Ok("google"));
    }

    #[test]
    fn leaflet_failure_is_reported() {
        let built = construct_backend(
            BackendKind::Leaflet,
            || true,
            || Ok("google"),
            || Err::<&str, _>("L.map failed".into()),
        );
        assert_eq!(built, Err("Leaflet map unavailable: L.map failed".to_string()));
    }

    #[test]
    fn current_search_hit_relocates() {
        let at = Coordinate::new(18.5204, 73.8567);
        assert!(at.is_some());
        assert_eq!(search_outcome(Ok(at), 4, 4), at);
    }

    #[test]
    fn stale_search_hit_is_dropped() {
        let at = Coordinate::new(18.5204, 73.8567);
        assert_eq!(search_outcome(Ok(at), 3, 4), None);
    }

    #[test]
    fn failed_or_empty_search_changes_nothing() {
        assert_eq!(search_outcome(Err("HTTP 503".into()), 2, 2), None);
        assert_eq!(search_outcome(Ok(None), 2, 2), None);
    }

    #[test]
    fn reverse_address_applies_only_when_latest() {
        let address = || Some("MG Road, Bengaluru".to_string());
        assert_eq!(reverse_outcome(address(), 7, 7), address());
        assert_eq!(reverse_outcome(address(), 6, 7), None);
        assert_eq!(reverse_outcome(None, 7, 7), None);
        assert_eq!(reverse_outcome(Some("  ".into()), 7, 7), None);
    }

    #[test]
    fn bump_is_monotonic() {
        let counter = Cell::new(0);
        assert_eq!(bump(&counter), 1);
        assert_eq!(bump(&counter), 2);
        assert_eq!(counter.get(), 2);
    }
}
