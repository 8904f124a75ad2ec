use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payload::ValidationError;

/// Successful `POST /predict` response. Single-row requests carry
/// `predicted_price`; batch-shaped responses carry `predictions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub predicted_price: Option<f64>,
    #[serde(default)]
    pub predictions: Option<Vec<f64>>,
    #[serde(default)]
    pub inference_time_ms: Option<f64>,
    #[serde(default)]
    pub preprocessing_time_ms: Option<f64>,
    #[serde(default)]
    pub model_inference_time_ms: Option<f64>,
    #[serde(default)]
    pub num_predictions: Option<usize>,
}

fn non_zero(v: Option<f64>) -> Option<f64> {
    v.filter(|n| *n != 0.0 && n.is_finite())
}

impl PredictionResponse {
    /// Price to display: `predicted_price`, else the first batch prediction, else 0.
    pub fn price(&self) -> f64 {
        non_zero(self.predicted_price)
            .or_else(|| self.predictions.as_ref().and_then(|p| p.first().copied()))
            .unwrap_or(0.0)
    }

    /// Total inference time, falling back to the model-only timing.
    pub fn inference_ms(&self) -> f64 {
        non_zero(self.inference_time_ms)
            .or_else(|| non_zero(self.model_inference_time_ms))
            .unwrap_or(0.0)
    }
}

/// Column list in an error body; some server versions send a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnList {
    Many(Vec<String>),
    One(String),
}

impl ColumnList {
    pub fn joined(&self) -> String {
        match self {
            Self::Many(cols) => cols.join(", "),
            Self::One(s) => s.clone(),
        }
    }
}

/// JSON body returned with a non-success status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub received_columns: Option<Vec<String>>,
    #[serde(default)]
    pub expected_columns: Option<ColumnList>,
}

impl ApiErrorBody {
    /// Multi-line message for the error panel. Each section is only added
    /// when the server supplied it.
    pub fn user_message(&self) -> String {
        let mut msg = self
            .error
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Prediction failed")
            .to_string();

        if let (Some(received), Some(expected)) = (&self.received_columns, &self.expected_columns) {
            msg.push_str("\n\nReceived columns: ");
            msg.push_str(&received.join(", "));
            msg.push_str("\nExpected columns: ");
            msg.push_str(&expected.joined());
        }
        if let Some(details) = self.details.as_deref().filter(|s| !s.is_empty()) {
            msg.push_str("\n\nDetails: ");
            msg.push_str(details);
        }
        if let Some(hint) = self.hint.as_deref().filter(|s| !s.is_empty()) {
            msg.push_str("\n\nHint: ");
            msg.push_str(hint);
        }
        msg
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

pub const CONNECTIVITY_MESSAGE: &str =
    "Cannot connect to server. Make sure the prediction server is running and try again.";

/// Everything that can stop a submission from producing a price.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Required fields missing; no request was sent.
    Validation(ValidationError),
    /// Server answered with a non-success status.
    Server { status: u16, message: String },
    /// Request never completed.
    Connectivity(String),
}

impl SubmitError {
    /// Build from a non-success response. `body` is the raw response text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed.user_message(),
            Err(_) => format!("Prediction failed (HTTP {status})"),
        };
        Self::Server { status, message }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{e}"),
            Self::Server { message, .. } => f.write_str(message),
            Self::Connectivity(_) => f.write_str(CONNECTIVITY_MESSAGE),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<ValidationError> for SubmitError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_prefers_predicted_price() {
        let resp: PredictionResponse = serde_json::from_value(json!({
            "predicted_price": 4_500_000.0,
            "inference_time_ms": 3.456,
            "preprocessing_time_ms": 1.2,
            "model_inference_time_ms": 2.2
        }))
        .unwrap();
        assert_eq!(resp.price(), 4_500_000.0);
        assert_eq!(resp.inference_ms(), 3.456);
    }

    #[test]
    fn price_falls_back_to_first_batch_prediction() {
        let resp: PredictionResponse = serde_json::from_value(json!({
            "predictions": [1_200_000.0, 9.0],
            "model_inference_time_ms": 0.8,
            "num_predictions": 2
        }))
        .unwrap();
        assert_eq!(resp.price(), 1_200_000.0);
        assert_eq!(resp.inference_ms(), 0.8);
        assert_eq!(PredictionResponse::default().price(), 0.0);
    }

    #[test]
    fn error_message_includes_only_supplied_sections() {
        let body = ApiErrorBody {
            error: Some("Column mismatch".into()),
            received_columns: Some(vec!["RERA".into(), "area".into()]),
            expected_columns: Some(ColumnList::Many(vec!["RERA".into(), "SQUARE_FT".into()])),
            hint: Some("Retrain the model".into()),
            ..ApiErrorBody::default()
        };
        assert_eq!(
            body.user_message(),
            "Column mismatch\n\nReceived columns: RERA, area\nExpected columns: RERA, SQUARE_FT\n\nHint: Retrain the model"
        );
    }

    #[test]
    fn columns_need_both_lists() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "received_columns": ["RERA"],
            "details": "shape mismatch"
        }))
        .unwrap();
        assert_eq!(body.user_message(), "Prediction failed\n\nDetails: shape mismatch");
    }

    #[test]
    fn expected_columns_may_be_a_string() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "error": "bad input",
            "received_columns": [],
            "expected_columns": "see model card"
        }))
        .unwrap();
        assert!(body.user_message().ends_with("Expected columns: see model card"));
    }

    #[test]
    fn unparseable_error_body_reports_status() {
        let err = SubmitError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "Prediction failed (HTTP 502)");
        let err = SubmitError::from_response(500, r#"{"error":"Model not loaded. Please train the model first."}"#);
        assert_eq!(err.to_string(), "Model not loaded. Please train the model first.");
    }

    #[test]
    fn connectivity_error_hides_transport_detail() {
        let err = SubmitError::Connectivity("TypeError: Failed to fetch".into());
        assert_eq!(err.to_string(), CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn health_defaults_to_not_loaded() {
        let health: HealthStatus = serde_json::from_value(json!({ "status": "healthy" })).unwrap();
        assert!(!health.model_loaded);
    }
}
