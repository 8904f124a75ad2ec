pub mod coords;
pub mod currency;
pub mod geocode;
pub mod payload;
pub mod prediction;

pub use coords::{Coordinate, DEFAULT_CENTER, LocationInput};
pub use currency::format_inr;
pub use payload::{FieldValue, FormFields, PredictionRequest, ValidationError};
pub use prediction::{ApiErrorBody, HealthStatus, PredictionResponse, SubmitError};
