//! Louver Rain Class Service - Backend Server
//!
//! Geocodes a location, averages its climate from the ERA5 reanalysis
//! archive (or a synthetic estimate), and recommends a BS EN 13030 rain
//! defence class for louvers on the building facade.

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use external::{Geocoder, NominatimClient};
use services::{ClimateDataProvider, ClimateSource, RainClassService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rain_class: RainClassService,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    /// Wire the services from configuration
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let source = ClimateSource::from_config(&config.climate);
        let provider = ClimateDataProvider::new(source, &config.climate);
        let rain_class = RainClassService::new(provider, config.classification.classifier());
        let geocoder = NominatimClient::new(&config.geocoding)?;

        Ok(Self {
            config: Arc::new(config),
            rain_class,
            geocoder: Arc::new(geocoder),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rain_class_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Louver Rain Class Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        "Classification policy: {:?}",
        config.classification.policy
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::from_config(config)?;
    tracing::info!(
        "Earth Engine configured: {}",
        state.rain_class.provider().is_live()
    );

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Louver Rain Class API v1.0"
}
