use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;

use crate::models::Feature;

/// Local, pre-flight input errors. These never reach the network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing value for {0}")]
    Missing(Feature),

    #[error("Invalid number for {0}")]
    NotANumber(Feature),

    #[error("{} must be between {} and {}", .feature.label(), .min, .max)]
    OutOfRange { feature: Feature, min: f64, max: f64 },
}

/// Failures surfaced after a call to the prediction service was attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Prediction timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    ServerStatus { code: u16, message: String },

    #[error("Unexpected response from prediction service: {0}")]
    MalformedResponse(String),
}

/// Terminal outcome of a failed submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Missing(_) => "missing",
            ValidationError::NotANumber(_) => "not_a_number",
            ValidationError::OutOfRange { .. } => "out_of_range",
        }
    }
}

impl RequestError {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::Timeout(_) => "timeout",
            RequestError::Transport(_) => "transport",
            RequestError::ServerStatus { .. } => "server_status",
            RequestError::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl SubmissionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Validation(e) => e.kind(),
            SubmissionError::Request(e) => e.kind(),
        }
    }
}

impl Serialize for SubmissionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SubmissionError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

// ==============================================================================
// HTTP-FACING ERRORS
// ==============================================================================

/// Application-wide error types for the console's HTTP surface
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    #[error("Prediction service error: {0}")]
    ExternalService(RequestError),

    #[error("{0}")]
    Timeout(RequestError),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(e) => e.kind(),
            AppError::ExternalService(e) | AppError::Timeout(e) => e.kind(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub code: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_code = match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ExternalService(_) => "PREDICTION_SERVICE_ERROR",
            AppError::Timeout(_) => "PREDICTION_TIMEOUT",
        };

        let response = ErrorResponse {
            error: error_code.to_string(),
            message: self.to_string(),
            details: Some(serde_json::json!({ "kind": self.kind() })),
            code: error_code.to_string(),
        };

        HttpResponse::build(self.status_code()).json(response)
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(e) => AppError::Validation(e),
            SubmissionError::Request(e @ RequestError::Timeout(_)) => AppError::Timeout(e),
            SubmissionError::Request(e) => AppError::ExternalService(e),
        }
    }
}

/// Helper type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_not_prefixed_twice() {
        let err = AppError::from(SubmissionError::from(RequestError::Timeout(
            Duration::from_secs(15),
        )));
        assert_eq!(err.to_string(), "Prediction timed out after 15s");
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn kind_survives_conversion_to_app_error() {
        let missing = SubmissionError::from(ValidationError::Missing(Feature::Ph));
        assert_eq!(AppError::from(missing.clone()).kind(), missing.kind());

        let status = SubmissionError::from(RequestError::ServerStatus {
            code: 500,
            message: "Request failed (500)".to_string(),
        });
        assert_eq!(AppError::from(status).kind(), "server_status");
    }
}
