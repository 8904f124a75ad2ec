use house_price_shared::Coordinate;
use house_price_shared::geocode::{self, ReverseHit, SearchHit};

/// Forward geocode an address through Nominatim, restricted to India.
/// `Ok(None)` means the lookup succeeded but nothing usable matched.
pub async fn search_address(query: &str) -> Result<Option<Coordinate>, String> {
    let url = geocode::search_url(query).map_err(|e| format!("url error: {e}"))?;
    let resp = gloo_net::http::Request::get(url.as_str())
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let hits = resp
        .json::<Vec<SearchHit>>()
        .await
        .map_err(|e| format!("parse error: {e}"))?;
    Ok(geocode::best_match(&hits))
}

/// Reverse geocode a position to Nominatim's display name.
pub async fn reverse_lookup(at: Coordinate) -> Result<Option<String>, String> {
    let url = geocode::reverse_url(at).map_err(|e| format!("url error: {e}"))?;
    let resp = gloo_net::http::Request::get(url.as_str())
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let hit = resp
        .json::<ReverseHit>()
        .await
        .map_err(|e| format!("parse error: {e}"))?;
    Ok(hit.address().map(str::to_owned))
}
