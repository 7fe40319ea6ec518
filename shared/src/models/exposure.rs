//! Site exposure models

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// Qualitative site shelter category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExposureType {
    /// Coastal areas, open terrain
    High,
    /// Suburban, forest
    #[default]
    Medium,
    /// City centres, dense urban areas
    Low,
}

impl ExposureType {
    /// Empirical exposure coefficient `a` used in the wind-driven rain formula
    pub fn coefficient(&self) -> f64 {
        match self {
            ExposureType::High => 0.35,
            ExposureType::Medium => 0.25,
            ExposureType::Low => 0.2,
        }
    }

    /// Parse a caller-supplied label; anything unrecognized is `Medium`
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => ExposureType::High,
            "low" => ExposureType::Low,
            _ => ExposureType::Medium,
        }
    }
}

/// Any input value; only strings can name an exposure
#[derive(Deserialize)]
#[serde(untagged)]
enum RawExposure {
    Label(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for ExposureType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawExposure::deserialize(deserializer)? {
            RawExposure::Label(label) => ExposureType::parse_lenient(&label),
            RawExposure::Other(_) => ExposureType::Medium,
        })
    }
}

impl std::fmt::Display for ExposureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExposureType::High => write!(f, "high"),
            ExposureType::Medium => write!(f, "medium"),
            ExposureType::Low => write!(f, "low"),
        }
    }
}

/// Classification input describing the facade being protected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ExposureConfig {
    #[serde(default)]
    pub exposure_type: ExposureType,
    /// Facade orientation in radians, 0 when unspecified
    #[serde(default, alias = "exposure_direction")]
    pub exposure_direction_radians: f64,
}

impl ExposureConfig {
    pub fn new(exposure_type: ExposureType, exposure_direction_radians: f64) -> Self {
        Self {
            exposure_type,
            exposure_direction_radians,
        }
    }
}
