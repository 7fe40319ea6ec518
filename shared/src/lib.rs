//! Shared types and models for the louver rain class service
//!
//! This crate holds the pure computation shared between the backend,
//! the browser (via WASM), and the tests: value types, unit conversions,
//! the synthetic climate estimate and the rain class policies.

pub mod conversions;
pub mod models;
pub mod synthetic;
pub mod types;
pub mod validation;

pub use conversions::*;
pub use models::*;
pub use synthetic::*;
pub use types::*;
pub use validation::*;
