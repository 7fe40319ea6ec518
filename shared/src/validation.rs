//! Validation utilities for coordinates and climate inputs

use thiserror::Error;
use validator::Validate;

use crate::models::ClimateObservation;
use crate::types::Coordinate;

/// Why a coordinate was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Coordinate values must be finite numbers")]
    NotFinite,
}

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Validate a coordinate pair against WGS84 bounds
pub fn validate_coordinate(coordinate: &Coordinate) -> Result<(), CoordinateError> {
    // Range checks pass NaN through, so test finiteness first
    if !coordinate.latitude.is_finite() || !coordinate.longitude.is_finite() {
        return Err(CoordinateError::NotFinite);
    }
    if let Err(errors) = coordinate.validate() {
        let fields = errors.field_errors();
        if fields.contains_key("latitude") {
            return Err(CoordinateError::LatitudeOutOfRange(coordinate.latitude));
        }
        return Err(CoordinateError::LongitudeOutOfRange(coordinate.longitude));
    }
    Ok(())
}

/// Parse a latitude/longitude pair given as text (query strings)
pub fn parse_coordinate(lat: &str, lon: &str) -> Result<Coordinate, CoordinateError> {
    let latitude: f64 = lat.trim().parse().map_err(|_| CoordinateError::NotFinite)?;
    let longitude: f64 = lon.trim().parse().map_err(|_| CoordinateError::NotFinite)?;
    Coordinate::new(latitude, longitude)
}

// ============================================================================
// Climate Validations
// ============================================================================

/// Check the physical invariants of an observation
pub fn validate_observation(observation: &ClimateObservation) -> Result<(), &'static str> {
    if !(observation.rainfall_mm_per_year >= 0.0) {
        return Err("Rainfall must be a non-negative number");
    }
    if !(observation.wind_speed_mps >= 0.0) {
        return Err("Wind speed must be a non-negative number");
    }
    if !(0.0..360.0).contains(&observation.wind_direction_degrees) {
        return Err("Wind direction must be within [0, 360)");
    }
    if !observation.temperature_celsius.is_finite() {
        return Err("Temperature must be a finite number");
    }
    Ok(())
}

/// Wind resistance category used when shortlisting louvers
pub fn wind_resistance_category(wind_speed_mps: f64) -> &'static str {
    if wind_speed_mps >= 20.0 {
        "High"
    } else if wind_speed_mps >= 10.0 {
        "Medium"
    } else {
        "Low"
    }
}
