//! Route definitions for the rain class service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Place name or raw coordinates to rain class
        .route(
            "/weather",
            get(handlers::weather_by_coordinates).post(handlers::weather_by_location),
        )
        // Location lookups without climate data
        .route("/validate-location", post(handlers::validate_location))
        .route("/reverse-geocode", get(handlers::reverse_geocode))
        // Classification of caller-supplied climate averages
        .route("/rain-class", post(handlers::classify_observation))
}
