//! Data models for the `EnvPredict` service
//!
//! This module contains the request-scoped domain models:
//! - City: land-use composition, location and time of day
//! - Weather: the conditions a prediction is evaluated against

pub mod city;
pub mod weather;

// Re-export all public types for convenient access
pub use city::{CityConfiguration, Coordinates};
pub use weather::{DataSource, WeatherSnapshot};
