use wasm_bindgen_futures::spawn_local;

use house_price_shared::HealthStatus;

use crate::config::{HEALTH_PATH, endpoint};

pub async fn fetch_health(base: &str) -> Result<HealthStatus, String> {
    let resp = gloo_net::http::Request::get(&endpoint(base, HEALTH_PATH))
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<HealthStatus>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Ask the prediction server for its status once. Purely informational: results only go
/// to the console.
pub fn check_health(base: String) {
    spawn_local(async move {
        match fetch_health(&base).await {
            Ok(status) if !status.model_loaded => {
                web_sys::console::warn_1(&"Model not loaded yet".into());
            }
            Ok(_) => {}
            Err(e) => {
                web_sys::console::error_1(&format!("Health check failed: {e}").into());
            }
        }
    });
}
