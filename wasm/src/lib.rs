//! WebAssembly module for the louver rain class service
//!
//! Lets the browser work without a round trip to the server:
//! - Rain class for a set of climate averages
//! - Synthetic climate estimate for a coordinate
//! - Class explanations and wind resistance labels

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::synthetic_observation;

/// Climate averages as entered in the browser
#[derive(Debug, Deserialize)]
struct ObservationInput {
    #[serde(default)]
    temperature_celsius: f64,
    rainfall_mm_per_year: f64,
    wind_speed_mps: f64,
    wind_direction_degrees: f64,
}

#[derive(Debug, Serialize)]
struct ClassificationOutput {
    rain_class: RainClass,
    explanation: &'static str,
    effectiveness: &'static str,
    policy: RainClassPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    wind_driven_rain: Option<WindDrivenRain>,
}

/// Reference period reported for browser-side estimates
fn reference_period() -> DateRange {
    let start = NaiveDate::from_ymd_opt(2015, 7, 9).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2020, 7, 9).unwrap_or_default();
    DateRange::new(start, end)
}

fn parse_policy(policy: &str) -> Result<RainClassPolicy, String> {
    match policy.trim() {
        "" | "standard_derived" => Ok(RainClassPolicy::StandardDerived),
        "annual_threshold" => Ok(RainClassPolicy::AnnualThreshold),
        other => Err(format!("Unknown rain class policy: {}", other)),
    }
}

fn classify(
    observation_json: &str,
    exposure_type: &str,
    exposure_direction: f64,
    policy: &str,
) -> Result<String, String> {
    let input: ObservationInput = serde_json::from_str(observation_json)
        .map_err(|e| format!("Invalid observation JSON: {}", e))?;
    let policy = parse_policy(policy)?;

    let observation = ClimateObservation::new(
        input.temperature_celsius,
        input.rainfall_mm_per_year,
        input.wind_speed_mps,
        input.wind_direction_degrees,
        reference_period(),
        DataSource::Supplied,
    );
    validate_observation(&observation)?;

    let exposure = ExposureConfig::new(ExposureType::parse_lenient(exposure_type), exposure_direction);
    let rain_class = RainClassifier::new(policy).classify(&observation, &exposure);
    let wind_driven_rain = match policy {
        RainClassPolicy::StandardDerived => Some(WindDrivenRain::compute(&observation, &exposure)),
        RainClassPolicy::AnnualThreshold => None,
    };

    let output = ClassificationOutput {
        rain_class,
        explanation: rain_class.explanation(),
        effectiveness: rain_class.effectiveness(),
        policy,
        wind_driven_rain,
    };
    serde_json::to_string(&output).map_err(|e| e.to_string())
}

fn synthetic(latitude: f64, longitude: f64) -> Result<String, String> {
    let coordinate = Coordinate::new(latitude, longitude).map_err(|e| e.to_string())?;
    let observation = synthetic_observation(&coordinate, reference_period());
    serde_json::to_string(&observation).map_err(|e| e.to_string())
}

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

/// Classify climate averages, returning the classification as JSON
#[wasm_bindgen]
pub fn classify_rain_class(
    observation_json: &str,
    exposure_type: &str,
    exposure_direction: f64,
    policy: &str,
) -> Result<String, JsValue> {
    classify(observation_json, exposure_type, exposure_direction, policy).map_err(to_js_error)
}

/// Synthetic climate observation for a coordinate, as JSON
#[wasm_bindgen]
pub fn synthetic_climate(latitude: f64, longitude: f64) -> Result<String, JsValue> {
    synthetic(latitude, longitude).map_err(to_js_error)
}

/// Explanation text for a class letter
#[wasm_bindgen]
pub fn rain_class_explanation(letter: &str) -> Option<String> {
    RainClass::from_letter(letter).map(|class| class.explanation().to_string())
}

/// Wind resistance label for a mean wind speed in m/s
#[wasm_bindgen]
pub fn wind_resistance(wind_speed_mps: f64) -> String {
    wind_resistance_category(wind_speed_mps).to_string()
}

/// Exposure coefficient for a site label
#[wasm_bindgen]
pub fn exposure_coefficient(exposure_type: &str) -> f64 {
    ExposureType::parse_lenient(exposure_type).coefficient()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::Value;

    #[test]
    fn test_classify_standard_derived() {
        let json = classify(
            r#"{"rainfall_mm_per_year": 175200, "wind_speed_mps": 20, "wind_direction_degrees": 0}"#,
            "medium",
            0.0,
            "",
        )
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rain_class"], "D");
        assert_eq!(value["policy"], "standard_derived");
        assert_relative_eq!(value["wind_driven_rain"]["c_wdr"].as_f64().unwrap(), 1.0);
    }

    #[test]
    fn test_classify_annual_threshold() {
        let json = classify(
            r#"{"rainfall_mm_per_year": 1600, "wind_speed_mps": 3, "wind_direction_degrees": 45}"#,
            "LOW",
            1.0,
            "annual_threshold",
        )
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rain_class"], "B");
        assert_eq!(value["effectiveness"], "95-98.9%");
        assert!(value.get("wind_driven_rain").is_none());
    }

    #[test]
    fn test_classify_rejects_bad_input() {
        assert!(classify("{}", "medium", 0.0, "").is_err());
        assert!(classify(
            r#"{"rainfall_mm_per_year": 1, "wind_speed_mps": 1, "wind_direction_degrees": 0}"#,
            "medium",
            0.0,
            "guesswork"
        )
        .is_err());
    }

    #[test]
    fn test_synthetic_climate() {
        let json = synthetic_climate(0.0, 0.0).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_relative_eq!(value["rainfall_mm_per_year"].as_f64().unwrap(), 2000.0);
        assert_eq!(value["data_source"], "synthetic");

        assert!(synthetic(95.0, 0.0).is_err());
    }

    #[test]
    fn test_labels() {
        assert!(rain_class_explanation("a").unwrap().starts_with("Class A"));
        assert_eq!(rain_class_explanation("Z"), None);
        assert_eq!(wind_resistance(1.0), "Low");
        assert_relative_eq!(exposure_coefficient("high"), 0.35);
        assert_relative_eq!(exposure_coefficient("unknown"), 0.25);
    }
}
