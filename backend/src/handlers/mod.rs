//! HTTP handlers

pub mod health;
pub mod weather;

pub use health::health_check;
pub use weather::{
    classify_observation, reverse_geocode, validate_location, weather_by_coordinates,
    weather_by_location,
};

use axum::extract::{FromRequest, FromRequestParts};
use validator::ValidationErrors;

use crate::error::AppError;

/// JSON body extractor whose rejections render as `AppError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejections render as `AppError`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Turn the first failing field of a validator report into an `AppError`
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let first = errors
        .field_errors()
        .into_iter()
        .next()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", field));
            (field.to_string(), message)
        });

    match first {
        Some((field, message)) => AppError::Validation { field, message },
        None => AppError::Validation {
            field: "observation".to_string(),
            message: errors.to_string(),
        },
    }
}
