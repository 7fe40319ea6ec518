//! External API integrations

pub mod earth_engine;
pub mod geocoding;

pub use earth_engine::{BandMeans, ClimateArchive, EarthEngineClient};
pub use geocoding::{Geocoder, NominatimClient};
