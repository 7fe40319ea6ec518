//! Earth Engine client for reanalysis climate averages
//!
//! Talks to the Earth Engine REST `value:compute` endpoint, sending
//! expression graphs that filter an image collection by date and point,
//! average it over time, then reduce it spatially at the point.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use shared::{Coordinate, DateRange, PrecipitationUnit};
use std::time::Duration;

use crate::config::ClimateConfig;
use crate::error::ClimateError;

pub const TEMPERATURE_BAND: &str = "mean_2m_air_temperature";
pub const PRECIPITATION_BAND: &str = "total_precipitation";
pub const WIND_U_BAND: &str = "u_component_of_wind_10m";
pub const WIND_V_BAND: &str = "v_component_of_wind_10m";

pub const REQUIRED_BANDS: [&str; 4] = [
    TEMPERATURE_BAND,
    PRECIPITATION_BAND,
    WIND_U_BAND,
    WIND_V_BAND,
];

/// Raw band means for one point and window, in archive units
#[derive(Debug, Clone, PartialEq)]
pub struct BandMeans {
    pub temperature_kelvin: f64,
    /// Mean accumulation in the dataset's native precipitation unit
    pub precipitation: f64,
    pub wind_u: f64,
    pub wind_v: f64,
}

impl BandMeans {
    /// Pull the required bands out of a reducer result; a band that is
    /// absent or null is a `MissingVariable`
    pub fn from_reduction(values: &Map<String, Value>) -> Result<Self, ClimateError> {
        let band = |name: &str| {
            values
                .get(name)
                .and_then(Value::as_f64)
                .ok_or_else(|| ClimateError::MissingVariable(name.to_string()))
        };

        Ok(Self {
            temperature_kelvin: band(TEMPERATURE_BAND)?,
            precipitation: band(PRECIPITATION_BAND)?,
            wind_u: band(WIND_U_BAND)?,
            wind_v: band(WIND_V_BAND)?,
        })
    }
}

/// A gridded climate archive that can average named variables at a point
#[async_trait]
pub trait ClimateArchive: Send + Sync {
    /// Native unit of the archive's precipitation band
    fn precipitation_unit(&self) -> PrecipitationUnit;

    /// Number of records covering the point within the window
    async fn record_count(
        &self,
        window: DateRange,
        coordinate: Coordinate,
    ) -> Result<u64, ClimateError>;

    /// Time- and space-averaged band values at the point
    async fn mean_values(
        &self,
        window: DateRange,
        coordinate: Coordinate,
    ) -> Result<BandMeans, ClimateError>;
}

/// Earth Engine REST client
#[derive(Clone)]
pub struct EarthEngineClient {
    client: Client,
    base_url: String,
    project: String,
    access_token: Option<String>,
    dataset: String,
    precipitation_unit: PrecipitationUnit,
    scale_meters: f64,
    max_pixels: f64,
}

#[derive(Debug, Deserialize)]
struct ComputeValueResponse {
    result: Value,
}

impl EarthEngineClient {
    /// Create a client from the climate configuration
    pub fn new(config: &ClimateConfig) -> Result<Self, ClimateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClimateError::DataSourceUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            project: config
                .project_id
                .clone()
                .unwrap_or_else(|| "earthengine-legacy".to_string()),
            access_token: config.access_token.clone(),
            dataset: config.dataset.clone(),
            precipitation_unit: config.precipitation_unit,
            scale_meters: config.scale_meters,
            max_pixels: config.max_pixels,
        })
    }

    fn compute_url(&self) -> String {
        format!("{}/projects/{}/value:compute", self.base_url, self.project)
    }

    /// ImageCollection filtered to the window and to images covering the point
    fn filtered_collection(&self, window: DateRange, coordinate: Coordinate) -> Value {
        let loaded = invoke("ImageCollection.load", json!({ "id": constant(&self.dataset) }));

        let date_filter = invoke(
            "Filter.dateRangeContains",
            json!({
                "leftValue": invoke("DateRange", json!({
                    "start": constant(window.start.format("%Y-%m-%d").to_string()),
                    "end": constant(window.end.format("%Y-%m-%d").to_string()),
                })),
                "rightField": constant("system:time_start"),
            }),
        );

        let bounds_filter = invoke(
            "Filter.intersects",
            json!({
                "leftField": constant(".all"),
                "rightValue": point(coordinate),
            }),
        );

        let by_date = invoke(
            "Collection.filter",
            json!({ "collection": loaded, "filter": date_filter }),
        );
        invoke(
            "Collection.filter",
            json!({ "collection": by_date, "filter": bounds_filter }),
        )
    }

    fn count_expression(&self, window: DateRange, coordinate: Coordinate) -> Value {
        expression(invoke(
            "Collection.size",
            json!({ "collection": self.filtered_collection(window, coordinate) }),
        ))
    }

    fn mean_expression(&self, window: DateRange, coordinate: Coordinate) -> Value {
        let temporal_mean = invoke(
            "reduce.mean",
            json!({ "collection": self.filtered_collection(window, coordinate) }),
        );
        let selected = invoke(
            "Image.select",
            json!({ "input": temporal_mean, "bandSelectors": constant(REQUIRED_BANDS) }),
        );
        expression(invoke(
            "Image.reduceRegion",
            json!({
                "image": selected,
                "reducer": invoke("Reducer.mean", json!({})),
                "geometry": point(coordinate),
                "scale": constant(self.scale_meters),
                "maxPixels": constant(self.max_pixels),
            }),
        ))
    }

    async fn compute(&self, body: Value) -> Result<Value, ClimateError> {
        let mut request = self.client.post(self.compute_url()).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            ClimateError::DataSourceUnavailable(format!("Earth Engine request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClimateError::DataSourceUnavailable(format!(
                "Earth Engine error: {} - {}",
                status, body
            )));
        }

        let data: ComputeValueResponse = response.json().await.map_err(|e| {
            ClimateError::DataSourceUnavailable(format!(
                "Failed to parse Earth Engine response: {}",
                e
            ))
        })?;

        Ok(data.result)
    }
}

#[async_trait]
impl ClimateArchive for EarthEngineClient {
    fn precipitation_unit(&self) -> PrecipitationUnit {
        self.precipitation_unit
    }

    async fn record_count(
        &self,
        window: DateRange,
        coordinate: Coordinate,
    ) -> Result<u64, ClimateError> {
        let result = self.compute(self.count_expression(window, coordinate)).await?;
        result.as_u64().ok_or_else(|| {
            ClimateError::DataSourceUnavailable(format!("Unexpected collection size: {}", result))
        })
    }

    async fn mean_values(
        &self,
        window: DateRange,
        coordinate: Coordinate,
    ) -> Result<BandMeans, ClimateError> {
        let result = self.compute(self.mean_expression(window, coordinate)).await?;
        let values = result.as_object().ok_or_else(|| {
            ClimateError::DataSourceUnavailable(format!("Unexpected reduction result: {}", result))
        })?;
        BandMeans::from_reduction(values)
    }
}

fn constant(value: impl serde::Serialize) -> Value {
    json!({ "constantValue": value })
}

fn invoke(function_name: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function_name,
            "arguments": arguments,
        }
    })
}

fn point(coordinate: Coordinate) -> Value {
    invoke(
        "GeometryConstructors.Point",
        json!({ "coordinates": constant([coordinate.longitude, coordinate.latitude]) }),
    )
}

fn expression(root: Value) -> Value {
    json!({
        "expression": {
            "result": "0",
            "values": { "0": root },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::NaiveDate;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2015, 7, 9).unwrap(),
            NaiveDate::from_ymd_opt(2020, 7, 9).unwrap(),
        )
    }

    fn client_for(server: &MockServer) -> EarthEngineClient {
        let mut config = Config::defaults().unwrap().climate;
        config.api_endpoint = server.uri();
        config.project_id = Some("louvers".to_string());
        config.access_token = Some("test-token".to_string());
        EarthEngineClient::new(&config).unwrap()
    }

    #[test]
    fn test_band_means_missing_variable() {
        let values = json!({
            TEMPERATURE_BAND: 300.0,
            PRECIPITATION_BAND: 0.004,
            WIND_U_BAND: 1.0,
            WIND_V_BAND: null,
        });
        let err = BandMeans::from_reduction(values.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, ClimateError::MissingVariable(band) if band == WIND_V_BAND));
    }

    #[test]
    fn test_count_expression_shape() {
        let mut config = Config::defaults().unwrap().climate;
        config.project_id = None;
        let client = EarthEngineClient::new(&config).unwrap();
        let coordinate = Coordinate::new(1.35, 103.8).unwrap();

        let body = client.count_expression(window(), coordinate).to_string();
        assert!(body.contains("Collection.size"));
        assert!(body.contains("ECMWF/ERA5/DAILY"));
        assert!(body.contains("2015-07-09"));
        assert!(body.contains("[103.8,1.35]"));
        assert!(client.compute_url().ends_with("/projects/earthengine-legacy/value:compute"));
    }

    #[tokio::test]
    async fn test_record_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/louvers/value:compute"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_string_contains("Collection.size"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 1827 })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let count = client
            .record_count(window(), Coordinate::new(1.35, 103.8).unwrap())
            .await
            .unwrap();
        assert_eq!(count, 1827);
    }

    #[tokio::test]
    async fn test_mean_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/louvers/value:compute"))
            .and(body_string_contains("Image.reduceRegion"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    TEMPERATURE_BAND: 300.15,
                    PRECIPITATION_BAND: 0.006,
                    WIND_U_BAND: -3.0,
                    WIND_V_BAND: 4.0,
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let means = client
            .mean_values(window(), Coordinate::new(1.35, 103.8).unwrap())
            .await
            .unwrap();
        assert_eq!(
            means,
            BandMeans {
                temperature_kelvin: 300.15,
                precipitation: 0.006,
                wind_u: -3.0,
                wind_v: 4.0,
            }
        );
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .record_count(window(), Coordinate::new(1.35, 103.8).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::DataSourceUnavailable(msg) if msg.contains("403")));
    }
}
