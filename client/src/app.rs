use leptos::prelude::*;

use crate::config::PREDICT_PATH;
use crate::landing::Landing;
use crate::predict::PredictPage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Page {
    Landing,
    Predict,
}

impl Page {
    /// Route a pathname. Anything other than the prediction page lands.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/').to_ascii_lowercase();
        if trimmed == PREDICT_PATH
            || trimmed == format!("{PREDICT_PATH}.html")
            || trimmed.starts_with(&format!("{PREDICT_PATH}/"))
        {
            Page::Predict
        } else {
            Page::Landing
        }
    }
}

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
}

#[component]
pub fn App() -> impl IntoView {
    match Page::from_path(&current_path()) {
        Page::Landing => view! { <Landing /> }.into_any(),
        Page::Predict => view! { <PredictPage /> }.into_any(),
    }
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn root_is_landing() {
        assert_eq!(Page::from_path("/"), Page::Landing);
        assert_eq!(Page::from_path(""), Page::Landing);
        assert_eq!(Page::from_path("/index.html"), Page::Landing);
    }

    #[test]
    fn predict_routes() {
        assert_eq!(Page::from_path("/predict"), Page::Predict);
        assert_eq!(Page::from_path("/predict/"), Page::Predict);
        assert_eq!(Page::from_path("/predict.html"), Page::Predict);
        assert_eq!(Page::from_path("/PREDICT"), Page::Predict);
    }

    #[test]
    fn predict_subpaths_route_to_predict() {
        assert_eq!(Page::from_path("/predict/foo"), Page::Predict);
        assert_eq!(Page::from_path("/Predict/foo/bar/"), Page::Predict);
    }

    #[test]
    fn unknown_paths_land() {
        assert_eq!(Page::from_path("/predictions"), Page::Landing);
        assert_eq!(Page::from_path("/health"), Page::Landing);
    }
}
