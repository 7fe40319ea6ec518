//! Climate observation models

use serde::{Deserialize, Serialize};

use crate::conversions::normalize_degrees;
use crate::types::DateRange;

/// Where an observation's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Averaged from the ERA5 reanalysis archive via Earth Engine
    EarthEngine,
    /// Estimated from latitude/longitude without any external call
    Synthetic,
    /// Provided directly by the caller for classification
    Supplied,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::EarthEngine => "Google Earth Engine",
            DataSource::Synthetic => "Mock Climate Data",
            DataSource::Supplied => "Caller Supplied",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Averaged climate quantities for one coordinate over a reference period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateObservation {
    pub temperature_celsius: f64,
    /// Non-negative
    pub rainfall_mm_per_year: f64,
    /// Non-negative
    pub wind_speed_mps: f64,
    /// Meteorological convention (direction the wind blows FROM), [0, 360)
    pub wind_direction_degrees: f64,
    pub period: DateRange,
    pub data_source: DataSource,
}

impl ClimateObservation {
    /// Build an observation, clamping rainfall and wind speed at zero and
    /// wrapping the wind direction into [0, 360)
    pub fn new(
        temperature_celsius: f64,
        rainfall_mm_per_year: f64,
        wind_speed_mps: f64,
        wind_direction_degrees: f64,
        period: DateRange,
        data_source: DataSource,
    ) -> Self {
        Self {
            temperature_celsius,
            rainfall_mm_per_year: rainfall_mm_per_year.max(0.0),
            wind_speed_mps: wind_speed_mps.max(0.0),
            wind_direction_degrees: normalize_degrees(wind_direction_degrees),
            period,
            data_source,
        }
    }

    pub fn wind_direction_radians(&self) -> f64 {
        self.wind_direction_degrees.to_radians()
    }

    pub fn daily_rainfall_mm(&self) -> f64 {
        crate::conversions::annual_to_daily_mm(self.rainfall_mm_per_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn period() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(1997, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_constructor_clamps_and_wraps() {
        let obs = ClimateObservation::new(12.0, -5.0, -1.0, -90.0, period(), DataSource::Synthetic);
        assert_eq!(obs.rainfall_mm_per_year, 0.0);
        assert_eq!(obs.wind_speed_mps, 0.0);
        assert_eq!(obs.wind_direction_degrees, 270.0);
    }

    #[test]
    fn test_data_source_labels() {
        assert_eq!(DataSource::EarthEngine.to_string(), "Google Earth Engine");
        assert_eq!(DataSource::Synthetic.to_string(), "Mock Climate Data");
    }

    #[test]
    fn test_daily_rainfall() {
        let obs = ClimateObservation::new(12.0, 730.0, 3.0, 0.0, period(), DataSource::EarthEngine);
        assert_eq!(obs.daily_rainfall_mm(), 2.0);
    }
}
