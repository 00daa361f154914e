//! Configuration management for the `EnvPredict` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PredictError;
use crate::prediction::ModelCoefficients;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder shipped in sample configurations; treated as "no key".
const API_KEY_PLACEHOLDER: &str = "your_api_key_here";

/// Root configuration structure for the `EnvPredict` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Satellite data configuration
    #[serde(default)]
    pub satellite: SatelliteConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prediction model coefficients
    #[serde(default)]
    pub model: ModelCoefficients,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Weather provider (OpenWeatherMap) configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key; without it every request uses estimated weather
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Upper bound on the wait for the provider before falling back
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Client-side request budget
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

/// NASA Earthdata configuration. Only reported, the land surface
/// temperature is always estimated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatelliteConfig {
    pub earthdata_token: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u32 {
    5
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// Provider timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Whether a usable API key is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl SatelliteConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.earthdata_token.is_some()
    }
}

impl PredictConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ENVPREDICT_WEATHER__API_KEY style overrides
        builder = builder.add_source(
            Environment::with_prefix("ENVPREDICT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PredictConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("envpredict").join("config.toml"))
    }

    /// Pick up the unprefixed credential variables when no prefixed key was set
    fn apply_legacy_env(&mut self) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = std::env::var("OPENWEATHER_API_KEY").ok();
        }
        if self.satellite.earthdata_token.is_none() {
            self.satellite.earthdata_token = std::env::var("NASA_EARTHDATA_TOKEN").ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self
            .weather
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty() || key == API_KEY_PLACEHOLDER)
        {
            self.weather.api_key = None;
        }
        if self
            .satellite
            .earthdata_token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            self.satellite.earthdata_token = None;
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.requests_per_minute == 0 {
            self.weather.requests_per_minute = default_requests_per_minute();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.body_limit_bytes == 0 {
            self.server.body_limit_bytes = default_body_limit();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_model()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.weather.api_key {
            if api_key.len() < 8 {
                return Err(PredictError::config(
                    "Weather API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 100 {
                return Err(PredictError::config(
                    "Weather API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 60 {
            return Err(
                PredictError::config("Weather API timeout cannot exceed 60 seconds").into(),
            );
        }

        if self.weather.requests_per_minute > 10_000 {
            return Err(PredictError::config(
                "Weather API request budget cannot exceed 10000 requests per minute",
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(PredictError::config("Server port must be non-zero").into());
        }

        if self.server.body_limit_bytes > 10 * 1024 * 1024 {
            return Err(PredictError::config("Request body limit cannot exceed 10 MiB").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PredictError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PredictError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(PredictError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    fn validate_model(&self) -> Result<()> {
        let energy = &self.model.energy;
        if energy.wind_rated_speed <= energy.wind_cut_in_speed {
            return Err(PredictError::config(
                "Wind rated speed must be greater than the cut-in speed",
            )
            .into());
        }

        let weights = &self.model.score;
        let all_weights = [
            weights.temperature_weight,
            weights.air_quality_weight,
            weights.energy_weight,
        ];
        if all_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(
                PredictError::config("Composite score weights must be non-negative").into(),
            );
        }

        if self.model.air_quality.dispersion_threshold_speed <= 0.0 {
            return Err(PredictError::config(
                "Wind dispersion threshold speed must be positive",
            )
            .into());
        }

        Ok(())
    }
}
