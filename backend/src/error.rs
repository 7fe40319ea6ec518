//! Error handling for the rain class service
//!
//! `ClimateError` stays inside the climate provider, which recovers from it
//! with synthetic data. `AppError` is what reaches HTTP callers.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::CoordinateError;
use thiserror::Error;

/// Failures while sourcing climate data from the archive
#[derive(Error, Debug)]
pub enum ClimateError {
    #[error("Climate data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("No records in {window} or the alternate window")]
    NoRecordsInWindow { window: String },

    #[error("Required variable missing from archive response: {0}")]
    MissingVariable(String),

    #[error("Climate archive query timed out after {0}s")]
    Timeout(u64),
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Could not geocode location: {0}")]
    LocationNotFound(String),

    // External service errors
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error(transparent)]
    Climate(#[from] ClimateError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCoordinate(_)
            | AppError::Validation { .. }
            | AppError::LocationNotFound(_) => StatusCode::BAD_REQUEST,
            AppError::Geocoding(_) => StatusCode::BAD_GATEWAY,
            AppError::Climate(ClimateError::NoRecordsInWindow { .. }) => StatusCode::NOT_FOUND,
            AppError::Climate(ClimateError::MissingVariable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Climate(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, field) = match self {
            AppError::InvalidCoordinate(_) => ("INVALID_COORDINATE", None),
            AppError::Validation { field, .. } => ("VALIDATION_ERROR", Some(field.clone())),
            AppError::LocationNotFound(_) => ("LOCATION_NOT_FOUND", Some("location".to_string())),
            AppError::Geocoding(_) => ("GEOCODING_ERROR", None),
            AppError::Climate(ClimateError::NoRecordsInWindow { .. }) => ("NO_RECORDS_IN_WINDOW", None),
            AppError::Climate(ClimateError::MissingVariable(_)) => ("MISSING_VARIABLE", None),
            AppError::Climate(_) => ("DATA_SOURCE_UNAVAILABLE", None),
            AppError::Configuration(_) => ("CONFIGURATION_ERROR", None),
            AppError::InternalError(_) => ("INTERNAL_ERROR", None),
        };

        let message = match self {
            AppError::InternalError(_) => "An internal server error occurred".to_string(),
            AppError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };

        ErrorDetail {
            code: code.to_string(),
            message,
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_detail = self.detail();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            field: "body".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation {
            field: "query".to_string(),
            message: rejection.body_text(),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidCoordinate(CoordinateError::NotFinite).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::LocationNotFound("Atlantis".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ClimateError::DataSourceUnavailable("down".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(ClimateError::Timeout(30)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(ClimateError::NoRecordsInWindow {
                window: "2015-07-09 to 2020-07-09".into()
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ClimateError::MissingVariable("total_precipitation".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_detail_codes() {
        let detail = AppError::LocationNotFound("Atlantis".into()).detail();
        assert_eq!(detail.code, "LOCATION_NOT_FOUND");
        assert_eq!(detail.message, "Could not geocode location: Atlantis");
        assert_eq!(detail.field.as_deref(), Some("location"));

        let detail = AppError::InternalError(anyhow::anyhow!("secret")).detail();
        assert_eq!(detail.message, "An internal server error occurred");
    }
}
