//! Business logic services for the rain class service

pub mod climate;
pub mod rain_class;

pub use climate::{ClimateDataProvider, ClimateSource};
pub use rain_class::{Classification, RainClassReport, RainClassService};
