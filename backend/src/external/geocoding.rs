//! Geocoding via Nominatim (OpenStreetMap)
//!
//! Forward lookups turn a free-text place name into a `LocationResult`;
//! reverse lookups turn a coordinate back into a display address.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinate, LocationResult};
use std::time::Duration;

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};

/// Resolves place names to coordinates and back
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the place is unknown
    async fn resolve(&self, query: &str) -> AppResult<Option<LocationResult>>;

    /// `Ok(None)` when nothing is known at the coordinate
    async fn reverse(&self, coordinate: Coordinate) -> AppResult<Option<String>>;
}

/// Nominatim API client
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Configuration(format!("Geocoding client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Geocoding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Geocoding(format!(
                "Nominatim returned status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn resolve(&self, query: &str) -> AppResult<Option<LocationResult>> {
        let places: Vec<NominatimPlace> = self
            .get_json(
                "search",
                &[
                    ("q", query.to_string()),
                    ("format", "json".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        let Some(place) = places.into_iter().next() else {
            tracing::debug!("No geocoding match for {:?}", query);
            return Ok(None);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| AppError::Geocoding(format!("Bad latitude {:?}", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| AppError::Geocoding(format!("Bad longitude {:?}", place.lon)))?;

        let coordinate = Coordinate::new(latitude, longitude)?;
        tracing::info!("Geocoded {:?} to {}, {}", query, latitude, longitude);
        Ok(Some(LocationResult::new(place.display_name, coordinate)))
    }

    async fn reverse(&self, coordinate: Coordinate) -> AppResult<Option<String>> {
        let body: NominatimReverse = self
            .get_json(
                "reverse",
                &[
                    ("lat", coordinate.latitude.to_string()),
                    ("lon", coordinate.longitude.to_string()),
                    ("format", "json".to_string()),
                    ("zoom", "10".to_string()),
                ],
            )
            .await?;
        Ok(body.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NominatimClient {
        let mut config = Config::defaults().unwrap().geocoding;
        config.base_url = server.uri();
        NominatimClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Singapore"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "lat": "1.2899175", "lon": "103.8519072", "display_name": "Singapore" }
            ])))
            .mount(&server)
            .await;

        let location = client_for(&server).resolve("Singapore").await.unwrap().unwrap();
        assert_eq!(location.address, "Singapore");
        assert_eq!(location.coordinate.latitude, 1.2899175);
        assert_eq!(location.coordinate.longitude, 103.8519072);
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let location = client_for(&server).resolve("Atlantis").await.unwrap();
        assert!(location.is_none());
    }

    #[tokio::test]
    async fn test_resolve_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve("Singapore").await.unwrap_err();
        assert!(matches!(err, AppError::Geocoding(_)));
    }

    #[tokio::test]
    async fn test_reverse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "51.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "display_name": "London, Greater London, England, United Kingdom"
            })))
            .mount(&server)
            .await;

        let address = client_for(&server)
            .reverse(Coordinate::new(51.5, -0.12).unwrap())
            .await
            .unwrap();
        assert_eq!(
            address.as_deref(),
            Some("London, Greater London, England, United Kingdom")
        );
    }
}
