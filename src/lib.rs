//! `EnvPredict` - Urban environmental prediction service
//!
//! This library estimates how a city's land use shapes its climate: the
//! urban heat island, air quality and renewable energy balance, folded into
//! a single composite score. Weather comes from OpenWeatherMap when it is
//! configured and reachable, otherwise from a deterministic estimate.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod prediction;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::PredictConfig;
pub use error::PredictError;
pub use models::{CityConfiguration, Coordinates, DataSource, WeatherSnapshot};
pub use prediction::{ModelCoefficients, PredictionResult, PredictionService};
pub use weather::{WeatherProvider, WeatherResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PredictError>;
