//! HTTP handlers for location lookup and rain class endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use shared::{
    parse_coordinate, validate_observation, ClimateObservation, Coordinate, DataSource, DateRange,
    ExposureConfig, ExposureType, LocationResult, RainClassPolicy,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::{validation_error, AppJson, AppQuery};
use crate::services::{Classification, RainClassReport};
use crate::AppState;

/// Body for place-name lookups
#[derive(Debug, Deserialize, Validate)]
pub struct LocationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide a location"))]
    pub location: String,
    #[serde(default)]
    pub exposure_type: ExposureType,
    /// Facade orientation in radians
    #[serde(default)]
    pub exposure_direction: f64,
}

/// Query parameters for coordinate lookups
#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    #[serde(default)]
    pub exposure_type: ExposureType,
    #[serde(default)]
    pub exposure_direction: f64,
}

/// Location without climate data
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: String,
    pub coordinates: [f64; 2],
}

impl From<LocationResult> for LocationResponse {
    fn from(location: LocationResult) -> Self {
        Self {
            coordinates: location.coordinate.as_pair(),
            location: location.address,
        }
    }
}

/// Caller-supplied climate averages to classify
#[derive(Debug, Deserialize, Validate)]
pub struct ObservationInput {
    #[serde(default)]
    pub temperature_celsius: f64,
    #[validate(range(min = 0.0, message = "Rainfall cannot be negative"))]
    pub rainfall_mm_per_year: f64,
    #[validate(range(min = 0.0, message = "Wind speed cannot be negative"))]
    pub wind_speed_mps: f64,
    #[validate(range(min = 0.0, max = 360.0, message = "Wind direction must be within [0, 360]"))]
    pub wind_direction_degrees: f64,
    pub period: Option<DateRange>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClassifyRequest {
    #[validate]
    pub observation: ObservationInput,
    #[serde(default)]
    pub exposure: ExposureConfig,
    pub policy: Option<RainClassPolicy>,
}

async fn resolve_location(state: &AppState, query: &str) -> AppResult<LocationResult> {
    state
        .geocoder
        .resolve(query)
        .await?
        .ok_or_else(|| AppError::LocationNotFound(query.to_string()))
}

fn coordinate_from_query(query: &CoordinateQuery) -> AppResult<Coordinate> {
    match (query.lat.as_deref(), query.lon.as_deref()) {
        (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => {
            Ok(parse_coordinate(lat, lon)?)
        }
        _ => Err(AppError::Validation {
            field: "lat".to_string(),
            message: "Please provide lat and lon parameters".to_string(),
        }),
    }
}

/// Geocode a place name and return its rain class report
pub async fn weather_by_location(
    State(state): State<AppState>,
    AppJson(input): AppJson<LocationRequest>,
) -> AppResult<Json<RainClassReport>> {
    input.validate().map_err(validation_error)?;

    let location = resolve_location(&state, input.location.trim()).await?;
    let exposure = ExposureConfig::new(input.exposure_type, input.exposure_direction);
    let report = state.rain_class.assess(&location, exposure).await?;
    Ok(Json(report))
}

/// Rain class report for raw coordinates
pub async fn weather_by_coordinates(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CoordinateQuery>,
) -> AppResult<Json<RainClassReport>> {
    let coordinate = coordinate_from_query(&query)?;
    let location = LocationResult::from_coordinate(coordinate);
    let exposure = ExposureConfig::new(query.exposure_type, query.exposure_direction);
    let report = state.rain_class.assess(&location, exposure).await?;
    Ok(Json(report))
}

/// Check that a place name geocodes, without fetching climate data
pub async fn validate_location(
    State(state): State<AppState>,
    AppJson(input): AppJson<LocationRequest>,
) -> AppResult<Json<LocationResponse>> {
    input.validate().map_err(validation_error)?;

    let location = resolve_location(&state, input.location.trim()).await?;
    Ok(Json(location.into()))
}

/// Display address for a coordinate, labelled with the raw numbers when
/// the geocoder knows nothing there
pub async fn reverse_geocode(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CoordinateQuery>,
) -> AppResult<Json<LocationResponse>> {
    let coordinate = coordinate_from_query(&query)?;
    let location = match state.geocoder.reverse(coordinate).await {
        Ok(Some(address)) => LocationResult::new(address, coordinate),
        Ok(None) => LocationResult::from_coordinate(coordinate),
        Err(e) => {
            tracing::warn!("Reverse geocoding failed: {}", e);
            LocationResult::from_coordinate(coordinate)
        }
    };
    Ok(Json(location.into()))
}

/// Classify caller-supplied climate averages
pub async fn classify_observation(
    State(state): State<AppState>,
    AppJson(input): AppJson<ClassifyRequest>,
) -> AppResult<Json<Classification>> {
    input.validate().map_err(validation_error)?;

    let raw = input.observation;
    let period = raw
        .period
        .unwrap_or_else(|| state.config.climate.primary_window.into());
    let observation = ClimateObservation::new(
        raw.temperature_celsius,
        raw.rainfall_mm_per_year,
        raw.wind_speed_mps,
        raw.wind_direction_degrees,
        period,
        DataSource::Supplied,
    );
    validate_observation(&observation).map_err(|message| AppError::Validation {
        field: "observation".to_string(),
        message: message.to_string(),
    })?;

    let classification = state
        .rain_class
        .classify(&observation, &input.exposure, input.policy);
    Ok(Json(classification))
}
