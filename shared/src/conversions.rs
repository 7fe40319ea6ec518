//! Unit conversions between reanalysis archive units and the units used by
//! the rain class calculation.

use serde::{Deserialize, Serialize};

/// Offset between Kelvin and Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const HOURS_PER_DAY: f64 = 24.0;
pub const MM_PER_METER: f64 = 1000.0;

/// Native precipitation unit of a gridded dataset band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationUnit {
    /// Daily accumulated depth in meters (ERA5 daily aggregates)
    #[default]
    MetersPerDay,
    /// Hourly accumulated depth in meters (ERA5-Land hourly)
    MetersPerHour,
}

impl PrecipitationUnit {
    /// Convert a mean accumulation in this unit to an annual depth in mm
    pub fn to_mm_per_year(self, value: f64) -> f64 {
        match self {
            PrecipitationUnit::MetersPerDay => value * MM_PER_METER * DAYS_PER_YEAR,
            PrecipitationUnit::MetersPerHour => {
                value * MM_PER_METER * HOURS_PER_DAY * DAYS_PER_YEAR
            }
        }
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Magnitude of the (u, v) wind vector in m/s
pub fn wind_speed(u: f64, v: f64) -> f64 {
    u.hypot(v)
}

/// Convert (u, v) components (direction blown toward) into the
/// meteorological direction the wind blows FROM, in degrees [0, 360)
pub fn meteorological_direction(u: f64, v: f64) -> f64 {
    normalize_degrees(v.atan2(u).to_degrees() + 180.0)
}

/// Wrap any angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn annual_to_daily_mm(mm_per_year: f64) -> f64 {
    mm_per_year / DAYS_PER_YEAR
}
