//! Rain defence classification models
//!
//! Two policies are supported. `StandardDerived` follows the wind-driven
//! rain calculation of BS EN 13030:2001; `AnnualThreshold` buckets the
//! annual rainfall depth directly.

use serde::{Deserialize, Serialize};

use super::climate::ClimateObservation;
use super::exposure::ExposureConfig;

/// Reference rain rate (l/h per m²) the relative exposure is normalised to
pub const REFERENCE_RAIN_RATE: f64 = 20.83;

/// Louver rain defence class, A requiring the most protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RainClass {
    A,
    B,
    C,
    D,
}

impl RainClass {
    /// 3 for A down to 0 for D
    pub fn severity(&self) -> u8 {
        match self {
            RainClass::A => 3,
            RainClass::B => 2,
            RainClass::C => 1,
            RainClass::D => 0,
        }
    }

    /// Rain defence effectiveness band from BS EN 13030
    pub fn effectiveness(&self) -> &'static str {
        match self {
            RainClass::A => "99-100%",
            RainClass::B => "95-98.9%",
            RainClass::C => "80-94.9%",
            RainClass::D => "<80%",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            RainClass::A => "Class A: Highest level of rain defense required. Expect heavy rain and strong winds.",
            RainClass::B => "Class B: High level of rain defense recommended. Moderate to heavy rainfall expected.",
            RainClass::C => "Class C: Moderate rain defense adequate. Light to moderate rainfall typical.",
            RainClass::D => "Class D: Basic rain defense sufficient. Low rainfall environment.",
        }
    }

    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim() {
            "A" | "a" => Some(RainClass::A),
            "B" | "b" => Some(RainClass::B),
            "C" | "c" => Some(RainClass::C),
            "D" | "d" => Some(RainClass::D),
            _ => None,
        }
    }
}

impl std::fmt::Display for RainClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RainClass::A => write!(f, "A"),
            RainClass::B => write!(f, "B"),
            RainClass::C => write!(f, "C"),
            RainClass::D => write!(f, "D"),
        }
    }
}

/// Which classification formula to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RainClassPolicy {
    #[default]
    StandardDerived,
    AnnualThreshold,
}

/// Minimum annual rainfall (mm) for each class under `AnnualThreshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualThresholds {
    pub class_a_mm: f64,
    pub class_b_mm: f64,
    pub class_c_mm: f64,
}

impl Default for AnnualThresholds {
    fn default() -> Self {
        Self {
            class_a_mm: 2000.0,
            class_b_mm: 1500.0,
            class_c_mm: 1000.0,
        }
    }
}

/// Intermediate quantities of the wind-driven rain calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindDrivenRain {
    pub wind_angle_factor: f64,
    /// Wind-driven rain coefficient, capped at 1
    pub c_wdr: f64,
    /// Wind-driven rain rate, l/h per m²
    pub q_wdr: f64,
    pub relative_exposure: f64,
}

impl WindDrivenRain {
    pub fn compute(observation: &ClimateObservation, exposure: &ExposureConfig) -> Self {
        let a = exposure.exposure_type.coefficient();
        let wind_angle_factor = (observation.wind_direction_radians()
            - exposure.exposure_direction_radians)
            .cos()
            .abs();
        let c_wdr = (a * observation.wind_speed_mps * wind_angle_factor).min(1.0);
        let q_wdr = (observation.daily_rainfall_mm() / 24.0 * c_wdr) / 3600.0;
        let relative_exposure = q_wdr / REFERENCE_RAIN_RATE;

        Self {
            wind_angle_factor,
            c_wdr,
            q_wdr,
            relative_exposure,
        }
    }

    pub fn rain_class(&self) -> RainClass {
        classify_relative_exposure(self.relative_exposure)
    }
}

/// Map a relative exposure onto the effectiveness rating thresholds
pub fn classify_relative_exposure(relative_exposure: f64) -> RainClass {
    if relative_exposure >= 0.8 {
        RainClass::A
    } else if relative_exposure >= 0.4 {
        RainClass::B
    } else if relative_exposure >= 0.2 {
        RainClass::C
    } else {
        RainClass::D
    }
}

/// Classify with the BS EN 13030:2001 wind-driven rain formula
pub fn classify_standard_derived(
    observation: &ClimateObservation,
    exposure: &ExposureConfig,
) -> RainClass {
    WindDrivenRain::compute(observation, exposure).rain_class()
}

/// Classify on annual rainfall depth alone
pub fn classify_annual_threshold(
    observation: &ClimateObservation,
    thresholds: &AnnualThresholds,
) -> RainClass {
    let rainfall = observation.rainfall_mm_per_year;
    if rainfall >= thresholds.class_a_mm {
        RainClass::A
    } else if rainfall >= thresholds.class_b_mm {
        RainClass::B
    } else if rainfall >= thresholds.class_c_mm {
        RainClass::C
    } else {
        RainClass::D
    }
}

/// Rain classifier bound to one policy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RainClassifier {
    pub policy: RainClassPolicy,
    #[serde(default)]
    pub annual_thresholds: AnnualThresholds,
}

impl RainClassifier {
    pub fn new(policy: RainClassPolicy) -> Self {
        Self {
            policy,
            annual_thresholds: AnnualThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: AnnualThresholds) -> Self {
        self.annual_thresholds = thresholds;
        self
    }

    pub fn classify(&self, observation: &ClimateObservation, exposure: &ExposureConfig) -> RainClass {
        match self.policy {
            RainClassPolicy::StandardDerived => classify_standard_derived(observation, exposure),
            RainClassPolicy::AnnualThreshold => {
                classify_annual_threshold(observation, &self.annual_thresholds)
            }
        }
    }
}
