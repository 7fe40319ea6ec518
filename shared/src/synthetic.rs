//! Synthetic climate estimate used when no reanalysis archive is reachable.
//!
//! Values depend only on the coordinate, so repeated calls agree and
//! different places get different numbers without any network access.

use crate::conversions::normalize_degrees;
use crate::models::{ClimateObservation, DataSource};
use crate::types::{Coordinate, DateRange};

/// Latitude bounding the tropical band (exclusive)
pub const TROPIC_LATITUDE: f64 = 23.5;

pub fn is_tropical(latitude: f64) -> bool {
    latitude.abs() < TROPIC_LATITUDE
}

/// Estimate climate averages for a coordinate, tagged as synthetic
pub fn synthetic_observation(coordinate: &Coordinate, period: DateRange) -> ClimateObservation {
    let abs_lat = coordinate.latitude.abs();

    let (temperature, rainfall) = if is_tropical(coordinate.latitude) {
        (
            26.0 + 5.0 * abs_lat / TROPIC_LATITUDE,
            1800.0 + 200.0 * (1.0 - abs_lat / TROPIC_LATITUDE),
        )
    } else {
        (
            15.0 + 10.0 * (1.0 - abs_lat / 90.0),
            500.0 + 500.0 * (1.0 - abs_lat / 90.0),
        )
    };

    let wind_speed = 3.5 + 2.0 * abs_lat / 90.0;
    let wind_direction = normalize_degrees(coordinate.longitude + 180.0);

    ClimateObservation::new(
        temperature,
        rainfall,
        wind_speed,
        wind_direction,
        period,
        DataSource::Synthetic,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn period() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2015, 7, 9).unwrap(),
            NaiveDate::from_ymd_opt(2020, 7, 9).unwrap(),
        )
    }

    #[test]
    fn test_equator() {
        let obs = synthetic_observation(&Coordinate::new(0.0, 0.0).unwrap(), period());
        assert_relative_eq!(obs.temperature_celsius, 26.0);
        assert_relative_eq!(obs.rainfall_mm_per_year, 2000.0);
        assert_relative_eq!(obs.wind_speed_mps, 3.5);
        assert_relative_eq!(obs.wind_direction_degrees, 180.0);
        assert_eq!(obs.data_source, DataSource::Synthetic);
    }

    #[test]
    fn test_tropic_boundary_is_not_tropical() {
        assert!(!is_tropical(23.5));
        assert!(!is_tropical(-23.5));
        assert!(is_tropical(23.499));

        let obs = synthetic_observation(&Coordinate::new(23.5, 0.0).unwrap(), period());
        assert_relative_eq!(obs.temperature_celsius, 15.0 + 10.0 * (1.0 - 23.5 / 90.0));
        assert_relative_eq!(obs.rainfall_mm_per_year, 500.0 + 500.0 * (1.0 - 23.5 / 90.0));
    }

    #[test]
    fn test_pole() {
        let obs = synthetic_observation(&Coordinate::new(-90.0, 180.0).unwrap(), period());
        assert_relative_eq!(obs.temperature_celsius, 15.0);
        assert_relative_eq!(obs.rainfall_mm_per_year, 500.0);
        assert_relative_eq!(obs.wind_speed_mps, 5.5);
        // 180 + 180 wraps to 0
        assert_relative_eq!(obs.wind_direction_degrees, 0.0);
    }

    #[test]
    fn test_singapore() {
        let obs = synthetic_observation(&Coordinate::new(1.3521, 103.8198).unwrap(), period());
        assert_relative_eq!(obs.temperature_celsius, 26.0 + 5.0 * 1.3521 / 23.5);
        assert_relative_eq!(obs.wind_direction_degrees, 283.8198, epsilon = 1e-9);
        assert_eq!(obs.period, period());
    }
}
