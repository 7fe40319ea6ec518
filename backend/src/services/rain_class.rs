//! Rain class assessment service
//!
//! Combines the climate provider and the rain classifier into the summary
//! returned to callers.

use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::Serialize;
use shared::{
    wind_resistance_category, ClimateObservation, ExposureConfig, LocationResult, RainClass,
    RainClassPolicy, RainClassifier, WindDrivenRain,
};

use crate::error::AppResult;
use crate::services::climate::ClimateDataProvider;

/// Rounded climate summary plus recommended rain class for a location
#[derive(Debug, Clone, Serialize)]
pub struct RainClassReport {
    pub location: String,
    pub coordinates: [f64; 2],
    /// °C, 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub average_temperature: Decimal,
    /// mm per year, 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub average_rainfall: Decimal,
    /// m/s, 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub average_wind_speed: Decimal,
    /// Meteorological degrees, 1 decimal place
    #[serde(with = "rust_decimal::serde::float")]
    pub average_wind_direction: Decimal,
    pub recommended_rain_class: RainClass,
    pub rain_class_explanation: String,
    pub wind_resistance: String,
    pub exposure: ExposureConfig,
    pub policy: RainClassPolicy,
    pub period: String,
    pub data_source: String,
}

impl RainClassReport {
    pub fn new(
        location: &LocationResult,
        observation: &ClimateObservation,
        exposure: ExposureConfig,
        policy: RainClassPolicy,
        rain_class: RainClass,
    ) -> Self {
        Self {
            location: location.address.clone(),
            coordinates: location.coordinate.as_pair(),
            average_temperature: round(observation.temperature_celsius, 2),
            average_rainfall: round(observation.rainfall_mm_per_year, 2),
            average_wind_speed: round(observation.wind_speed_mps, 2),
            average_wind_direction: round(observation.wind_direction_degrees, 1),
            recommended_rain_class: rain_class,
            rain_class_explanation: rain_class.explanation().to_string(),
            wind_resistance: wind_resistance_category(observation.wind_speed_mps).to_string(),
            exposure,
            policy,
            period: observation.period.to_string(),
            data_source: observation.data_source.label().to_string(),
        }
    }
}

/// Result of classifying a caller-supplied observation
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub rain_class: RainClass,
    pub explanation: String,
    pub effectiveness: String,
    pub policy: RainClassPolicy,
    /// Only present for the standard-derived policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_driven_rain: Option<WindDrivenRain>,
}

fn round(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(dp)
}

/// Service producing rain class reports
#[derive(Clone)]
pub struct RainClassService {
    provider: ClimateDataProvider,
    classifier: RainClassifier,
}

impl RainClassService {
    pub fn new(provider: ClimateDataProvider, classifier: RainClassifier) -> Self {
        Self {
            provider,
            classifier,
        }
    }

    pub fn provider(&self) -> &ClimateDataProvider {
        &self.provider
    }

    /// Fetch climate for the location and classify it
    pub async fn assess(
        &self,
        location: &LocationResult,
        exposure: ExposureConfig,
    ) -> AppResult<RainClassReport> {
        tracing::info!(
            "Assessing rain class for {} ({}, {})",
            location.address,
            location.coordinate.latitude,
            location.coordinate.longitude
        );

        let observation = self.provider.fetch(location.coordinate).await?;
        let rain_class = self.classifier.classify(&observation, &exposure);

        tracing::info!(
            "Rain class {} for {} from {}",
            rain_class,
            location.address,
            observation.data_source
        );

        Ok(RainClassReport::new(
            location,
            &observation,
            exposure,
            self.classifier.policy,
            rain_class,
        ))
    }

    /// Classify an observation under the given policy, or the configured one
    pub fn classify(
        &self,
        observation: &ClimateObservation,
        exposure: &ExposureConfig,
        policy: Option<RainClassPolicy>,
    ) -> Classification {
        let mut classifier = self.classifier;
        if let Some(policy) = policy {
            classifier.policy = policy;
        }

        let rain_class = classifier.classify(observation, exposure);
        let wind_driven_rain = match classifier.policy {
            RainClassPolicy::StandardDerived => Some(WindDrivenRain::compute(observation, exposure)),
            RainClassPolicy::AnnualThreshold => None,
        };

        Classification {
            rain_class,
            explanation: rain_class.explanation().to_string(),
            effectiveness: rain_class.effectiveness().to_string(),
            policy: classifier.policy,
            wind_driven_rain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::climate::ClimateSource;
    use shared::{Coordinate, DataSource, ExposureType};

    fn service(policy: RainClassPolicy) -> RainClassService {
        let config = Config::defaults().unwrap();
        let provider = ClimateDataProvider::new(ClimateSource::Synthetic, &config.climate);
        RainClassService::new(provider, RainClassifier::new(policy))
    }

    fn singapore() -> LocationResult {
        LocationResult::new("Singapore", Coordinate::new(1.3521, 103.8198).unwrap())
    }

    #[tokio::test]
    async fn test_assess_synthetic_report() {
        let report = service(RainClassPolicy::StandardDerived)
            .assess(&singapore(), ExposureConfig::default())
            .await
            .unwrap();

        assert_eq!(report.location, "Singapore");
        assert_eq!(report.coordinates, [1.3521, 103.8198]);
        assert_eq!(report.recommended_rain_class, RainClass::D);
        assert_eq!(report.data_source, "Mock Climate Data");
        assert_eq!(report.period, "2015-07-09 to 2020-07-09");
        assert_eq!(report.wind_resistance, "Low");
        // 26 + 5 * 1.3521 / 23.5 = 26.2877
        assert_eq!(report.average_temperature, Decimal::new(2629, 2));
        // 283.8198 rounded to one place
        assert_eq!(report.average_wind_direction, Decimal::new(2838, 1));
    }

    #[tokio::test]
    async fn test_assess_annual_threshold() {
        let report = service(RainClassPolicy::AnnualThreshold)
            .assess(&singapore(), ExposureConfig::default())
            .await
            .unwrap();
        // 1800 + 200 * (1 - 1.3521 / 23.5) ≈ 1988.5 mm
        assert_eq!(report.recommended_rain_class, RainClass::B);
        assert_eq!(report.policy, RainClassPolicy::AnnualThreshold);
    }

    #[test]
    fn test_report_serializes_numbers() {
        let location = singapore();
        let observation = shared::synthetic_observation(
            &location.coordinate,
            Config::defaults().unwrap().climate.primary_window.into(),
        );
        let report = RainClassReport::new(
            &location,
            &observation,
            ExposureConfig::new(ExposureType::High, 0.0),
            RainClassPolicy::StandardDerived,
            RainClass::D,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["average_temperature"].is_f64());
        assert_eq!(json["recommended_rain_class"], "D");
        assert_eq!(json["exposure"]["exposure_type"], "high");
        assert_eq!(json["policy"], "standard_derived");
    }

    #[test]
    fn test_classify_policy_override() {
        let svc = service(RainClassPolicy::StandardDerived);
        let observation = ClimateObservation::new(
            20.0,
            2500.0,
            4.0,
            0.0,
            Config::defaults().unwrap().climate.primary_window.into(),
            DataSource::EarthEngine,
        );

        let standard = svc.classify(&observation, &ExposureConfig::default(), None);
        assert_eq!(standard.rain_class, RainClass::D);
        assert!(standard.wind_driven_rain.is_some());

        let annual = svc.classify(
            &observation,
            &ExposureConfig::default(),
            Some(RainClassPolicy::AnnualThreshold),
        );
        assert_eq!(annual.rain_class, RainClass::A);
        assert_eq!(annual.effectiveness, "99-100%");
        assert!(annual.wind_driven_rain.is_none());
    }
}
