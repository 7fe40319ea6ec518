//! Domain models for the rain class calculation

mod climate;
mod exposure;
mod rain_class;

pub use climate::*;
pub use exposure::*;
pub use rain_class::*;
