//! Response types for the Export Benefit Engine API.
//!
//! This module defines the error response structures and maps engine
//! errors onto HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error.code();
        let (status, error) = match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(code, "Configuration error", error.to_string()),
            ),
            EngineError::Validation { message, .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new(code, message.clone()))
            }
            EngineError::CalculationError { message } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(code, "Calculation failed", message.clone()),
            ),
            EngineError::RuleSetNotFound { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new(code, error.to_string()))
            }
            EngineError::RateSourceUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::with_details(
                    code,
                    "Rate source unavailable",
                    error.to_string(),
                ),
            ),
            EngineError::ClaimNotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new(code, error.to_string()))
            }
            EngineError::DuplicateClaim { .. }
            | EngineError::InvalidTransition { .. }
            | EngineError::ScripNotAllowed { .. } => {
                (StatusCode::CONFLICT, ApiError::new(code, error.to_string()))
            }
            EngineError::Store { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(code, "Storage failure", error.to_string()),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
