mod animation;
mod app;
mod config;
mod form;
mod geocode;
mod health;
mod landing;
mod map;
mod predict;
mod render_loop;
mod time_format;

use leptos::mount::mount_to;
use wasm_bindgen::JsCast;

use crate::config::APP_ROOT_ID;

/// `#app` from the page template, or `<body>` when the template lacks it.
fn mount_target(document: &web_sys::Document) -> Option<web_sys::HtmlElement> {
    document
        .get_element_by_id(APP_ROOT_ID)
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body())
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(target) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| mount_target(&d))
    else {
        web_sys::console::error_1(&"No element to mount the app on".into());
        return;
    };
    // Each page load mounts exactly once and lives until navigation.
    mount_to(target, app::App).forget();
}
