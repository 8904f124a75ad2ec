use js_sys::Array;
use wasm_bindgen::JsCast;

use house_price_shared::{PredictionRequest, PredictionResponse, SubmitError};

use crate::config::{PREDICT_PATH, endpoint};

/// Where the prediction form is in its submit cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmitPhase {
    /// Only one request may be in flight.
    pub fn can_submit(self) -> bool {
        self != SubmitPhase::Submitting
    }

    /// Claim the form for a new request. Refused while one is in flight or
    /// its result is still being revealed.
    pub fn begin(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        *self = SubmitPhase::Submitting;
        true
    }

    /// Record an outcome that is already on screen.
    pub fn finish(&mut self, ok: bool) {
        *self = if ok {
            SubmitPhase::Succeeded
        } else {
            SubmitPhase::Failed
        };
    }

    pub fn button_label(self) -> &'static str {
        match self {
            SubmitPhase::Submitting => "Predicting...",
            _ => "Predict Price",
        }
    }
}

/// Every `(name, value)` pair the browser would submit for `form`, in
/// document order. File entries are skipped.
pub fn form_entries(form: &web_sys::HtmlFormElement) -> Vec<(String, String)> {
    let Ok(data) = web_sys::FormData::new_with_form(form) else {
        return Vec::new();
    };
    let Ok(Some(iter)) = js_sys::try_iter(data.as_ref()) else {
        return Vec::new();
    };
    iter.filter_map(|entry| {
        let pair = entry.ok()?.dyn_into::<Array>().ok()?;
        let key = pair.get(0).as_string()?;
        let value = pair.get(1).as_string()?;
        Some((key, value))
    })
    .collect()
}

/// Collect, validate and order the form's fields into a request body.
pub fn build_request(form: &web_sys::HtmlFormElement) -> Result<PredictionRequest, SubmitError> {
    Ok(PredictionRequest::from_form(form_entries(form))?)
}

/// `POST {base}/predict` with the ordered JSON body.
pub async fn submit_prediction(
    base: &str,
    request: &PredictionRequest,
) -> Result<PredictionResponse, SubmitError> {
    let url = endpoint(base, PREDICT_PATH);
    let resp = gloo_net::http::Request::post(&url)
        .json(request)
        .map_err(|e| SubmitError::Connectivity(format!("encode error: {e}")))?
        .send()
        .await
        .map_err(|e| SubmitError::Connectivity(format!("fetch error: {e}")))?;

    let status = resp.status();
    if !resp.ok() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SubmitError::from_response(status, &body));
    }

    resp.json::<PredictionResponse>()
        .await
        .map_err(|e| SubmitError::Server {
            status,
            message: format!("Prediction failed (parse error: {e})"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitting_blocks_resubmit() {
        assert!(SubmitPhase::Idle.can_submit());
        assert!(!SubmitPhase::Submitting.can_submit());
        assert!(SubmitPhase::Succeeded.can_submit());
        assert!(SubmitPhase::Failed.can_submit());
    }

    #[test]
    fn reveal_delay_still_blocks_resubmit() {
        let mut phase = SubmitPhase::Idle;
        assert!(phase.begin());

        // Response in hand, result card not shown yet.
        let mut during_reveal = phase;
        assert!(!during_reveal.begin());
        assert_eq!(during_reveal, SubmitPhase::Submitting);

        phase.finish(true);
        assert_eq!(phase, SubmitPhase::Succeeded);
        assert!(phase.begin());
    }

    #[test]
    fn failure_reopens_the_form() {
        let mut phase = SubmitPhase::Idle;
        assert!(phase.begin());
        phase.finish(false);
        assert_eq!(phase, SubmitPhase::Failed);
        assert!(phase.can_submit());
    }

    #[test]
    fn button_label_tracks_phase() {
        assert_eq!(SubmitPhase::Submitting.button_label(), "Predicting...");
        assert_eq!(SubmitPhase::Idle.button_label(), "Predict Price");
        assert_eq!(SubmitPhase::default(), SubmitPhase::Idle);
    }
}
