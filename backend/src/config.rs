//! Configuration management for the rain class service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RAINCLASS_ prefix

use chrono::NaiveDate;
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{AnnualThresholds, DateRange, PrecipitationUnit, RainClassPolicy, RainClassifier};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Climate archive configuration
    pub climate: ClimateConfig,

    /// Geocoding configuration
    pub geocoding: GeocodingConfig,

    /// Rain class policy configuration
    pub classification: ClassificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Origins allowed to call the API from a browser
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClimateConfig {
    /// Whether to query Earth Engine at all
    pub enabled: bool,

    /// Earth Engine REST endpoint
    pub api_endpoint: String,

    /// Cloud project the requests are billed to
    #[serde(default)]
    pub project_id: Option<String>,

    /// OAuth access token for Earth Engine
    #[serde(default)]
    pub access_token: Option<String>,

    /// Image collection to average
    pub dataset: String,

    /// Native unit of the dataset's precipitation band
    pub precipitation_unit: PrecipitationUnit,

    /// Reduction scale in meters
    pub scale_meters: f64,

    /// Pixel budget for a single reduction
    pub max_pixels: f64,

    /// Upper bound for the whole archive query
    pub timeout_secs: u64,

    pub primary_window: WindowConfig,

    /// Tried once when the primary window has no records
    pub alternate_window: WindowConfig,

    /// Serve synthetic estimates when the archive fails
    pub allow_synthetic_fallback: bool,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct WindowConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl From<WindowConfig> for DateRange {
    fn from(window: WindowConfig) -> Self {
        DateRange::new(window.start, window.end)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Nominatim base URL
    pub base_url: String,

    /// User agent sent to Nominatim (required by its usage policy)
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassificationConfig {
    pub policy: RainClassPolicy,

    #[serde(default)]
    pub annual_thresholds: AnnualThresholds,
}

impl ClassificationConfig {
    pub fn classifier(&self) -> RainClassifier {
        RainClassifier::new(self.policy).with_thresholds(self.annual_thresholds)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("RAINCLASS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RAINCLASS_ prefix)
            .add_source(
                Environment::with_prefix("RAINCLASS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration built from code defaults alone
    #[cfg(test)]
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("development")?.build()?.try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default(
                "server.allowed_origins",
                vec![
                    "http://localhost:3000",
                    "http://127.0.0.1:3000",
                    "http://localhost:3001",
                ],
            )?
            .set_default("climate.enabled", false)?
            .set_default("climate.api_endpoint", "https://earthengine.googleapis.com/v1")?
            .set_default("climate.dataset", "ECMWF/ERA5/DAILY")?
            .set_default("climate.precipitation_unit", "meters_per_day")?
            .set_default("climate.scale_meters", 30000.0)?
            .set_default("climate.max_pixels", 1e9)?
            .set_default("climate.timeout_secs", 30)?
            .set_default("climate.primary_window.start", "2015-07-09")?
            .set_default("climate.primary_window.end", "2020-07-09")?
            .set_default("climate.alternate_window.start", "1997-01-01")?
            .set_default("climate.alternate_window.end", "2000-01-01")?
            .set_default("climate.allow_synthetic_fallback", true)?
            .set_default("geocoding.base_url", "https://nominatim.openstreetmap.org")?
            .set_default("geocoding.user_agent", "louvre_selector")?
            .set_default("geocoding.timeout_secs", 10)?
            .set_default("classification.policy", "standard_derived")
    }
}
