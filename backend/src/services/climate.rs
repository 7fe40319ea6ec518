//! Climate data provider
//!
//! Produces a `ClimateObservation` for a coordinate. A live archive is
//! queried when one was configured at startup; any failure there (no
//! records, missing band, HTTP error, timeout) degrades to the synthetic
//! estimate unless fallback has been disabled.

use shared::{
    kelvin_to_celsius, meteorological_direction, synthetic_observation, wind_speed,
    ClimateObservation, Coordinate, DataSource, DateRange, PrecipitationUnit,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClimateConfig;
use crate::error::{AppResult, ClimateError};
use crate::external::{BandMeans, ClimateArchive, EarthEngineClient};

/// The climate backend chosen once at startup
#[derive(Clone)]
pub enum ClimateSource {
    Live(Arc<dyn ClimateArchive>),
    Synthetic,
}

impl ClimateSource {
    /// Build the source from configuration; a disabled or unusable archive
    /// selects the synthetic strategy
    pub fn from_config(config: &ClimateConfig) -> Self {
        if !config.enabled {
            tracing::info!("Climate archive disabled, using synthetic climate data");
            return ClimateSource::Synthetic;
        }
        if config.access_token.is_none() {
            tracing::warn!("No Earth Engine access token configured, using synthetic climate data");
            return ClimateSource::Synthetic;
        }

        match EarthEngineClient::new(config) {
            Ok(client) => {
                tracing::info!(
                    "Earth Engine configured: dataset={} endpoint={}",
                    config.dataset,
                    config.api_endpoint
                );
                ClimateSource::Live(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!("Could not initialize Earth Engine client: {}", e);
                ClimateSource::Synthetic
            }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ClimateSource::Live(_))
    }
}

/// Fetches averaged climate observations for coordinates
#[derive(Clone)]
pub struct ClimateDataProvider {
    source: ClimateSource,
    primary_window: DateRange,
    alternate_window: DateRange,
    timeout: Duration,
    allow_synthetic_fallback: bool,
}

impl ClimateDataProvider {
    pub fn new(source: ClimateSource, config: &ClimateConfig) -> Self {
        Self {
            source,
            primary_window: config.primary_window.into(),
            alternate_window: config.alternate_window.into(),
            timeout: Duration::from_secs(config.timeout_secs),
            allow_synthetic_fallback: config.allow_synthetic_fallback,
        }
    }

    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_live(&self) -> bool {
        self.source.is_live()
    }

    /// Averaged climate for the coordinate
    pub async fn fetch(&self, coordinate: Coordinate) -> AppResult<ClimateObservation> {
        let archive = match &self.source {
            ClimateSource::Live(archive) => archive,
            ClimateSource::Synthetic => return Ok(self.synthetic(coordinate)),
        };

        let result = tokio::time::timeout(self.timeout, self.fetch_live(archive.as_ref(), coordinate))
            .await
            .unwrap_or_else(|_| Err(ClimateError::Timeout(self.timeout.as_secs())));

        match result {
            Ok(observation) => Ok(observation),
            Err(error) if self.allow_synthetic_fallback => {
                tracing::warn!("Falling back to synthetic climate data: {}", error);
                Ok(self.synthetic(coordinate))
            }
            Err(error) => Err(error.into()),
        }
    }

    fn synthetic(&self, coordinate: Coordinate) -> ClimateObservation {
        let observation = synthetic_observation(&coordinate, self.primary_window);
        tracing::debug!(
            "Synthetic climate for {}, {}: {:?}",
            coordinate.latitude,
            coordinate.longitude,
            observation
        );
        observation
    }

    async fn fetch_live(
        &self,
        archive: &dyn ClimateArchive,
        coordinate: Coordinate,
    ) -> Result<ClimateObservation, ClimateError> {
        let window = self.select_window(archive, coordinate).await?;
        let means = archive.mean_values(window, coordinate).await?;
        let observation = observation_from_means(&means, archive.precipitation_unit(), window);

        tracing::debug!(
            "Archive climate for {}, {}: temp={:.2}C rain={:.2}mm/yr wind={:.2}m/s dir={:.1}",
            coordinate.latitude,
            coordinate.longitude,
            observation.temperature_celsius,
            observation.rainfall_mm_per_year,
            observation.wind_speed_mps,
            observation.wind_direction_degrees
        );
        Ok(observation)
    }

    /// Primary window if it has records, otherwise the alternate one
    async fn select_window(
        &self,
        archive: &dyn ClimateArchive,
        coordinate: Coordinate,
    ) -> Result<DateRange, ClimateError> {
        let count = archive.record_count(self.primary_window, coordinate).await?;
        tracing::debug!("{} records in {}", count, self.primary_window);
        if count > 0 {
            return Ok(self.primary_window);
        }

        tracing::warn!(
            "No records in {}, retrying with {}",
            self.primary_window,
            self.alternate_window
        );
        let count = archive.record_count(self.alternate_window, coordinate).await?;
        tracing::debug!("{} records in {}", count, self.alternate_window);
        if count > 0 {
            return Ok(self.alternate_window);
        }

        Err(ClimateError::NoRecordsInWindow {
            window: self.primary_window.to_string(),
        })
    }
}

/// Convert archive band means into an observation
pub fn observation_from_means(
    means: &BandMeans,
    unit: PrecipitationUnit,
    window: DateRange,
) -> ClimateObservation {
    ClimateObservation::new(
        kelvin_to_celsius(means.temperature_kelvin),
        unit.to_mm_per_year(means.precipitation),
        wind_speed(means.wind_u, means.wind_v),
        meteorological_direction(means.wind_u, means.wind_v),
        window,
        DataSource::EarthEngine,
    )
}
