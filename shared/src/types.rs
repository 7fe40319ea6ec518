//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::CoordinateError;

/// GPS coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting out-of-range or non-finite values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        crate::validation::validate_coordinate(&coordinate)?;
        Ok(coordinate)
    }

    pub fn as_pair(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// A resolved location: the address a caller should see plus its coordinate.
///
/// Every sourcing path (geocoded place name, raw query-string coordinates)
/// produces this same value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationResult {
    pub address: String,
    pub coordinate: Coordinate,
}

impl LocationResult {
    pub fn new(address: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            address: address.into(),
            coordinate,
        }
    }

    /// Location built from bare coordinates, labelled the way the
    /// coordinate lookup endpoint reports it
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        Self {
            address: format!(
                "Coordinates: {}, {}",
                coordinate.latitude, coordinate.longitude
            ),
            coordinate,
        }
    }
}

/// Date range for climate averaging windows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_in_range() {
        let c = Coordinate::new(1.3521, 103.8198).unwrap();
        assert_eq!(c.as_pair(), [1.3521, 103.8198]);
    }

    #[test]
    fn test_coordinate_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_location_from_coordinate_address() {
        let c = Coordinate::new(51.5, -0.12).unwrap();
        let location = LocationResult::from_coordinate(c);
        assert_eq!(location.address, "Coordinates: 51.5, -0.12");
        assert_eq!(location.coordinate, c);
    }

    #[test]
    fn test_date_range_display() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2015, 7, 9).unwrap(),
            NaiveDate::from_ymd_opt(2020, 7, 9).unwrap(),
        );
        assert_eq!(range.to_string(), "2015-07-09 to 2020-07-09");
    }
}
