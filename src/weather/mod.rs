//! Weather resolution
//!
//! The resolver asks the configured provider for current conditions and
//! falls back to a deterministic estimate whenever that is not possible:
//! no provider, no coordinates, provider error or timeout. Callers always
//! receive a [`WeatherSnapshot`]; the provenance flag tells them which branch
//! produced it.

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::config::WeatherConfig;
use crate::models::{Coordinates, DataSource, WeatherSnapshot};

pub mod openweathermap;

pub use openweathermap::{OpenWeatherMapClient, RateLimiter};

/// Latitude assumed for the estimate when the request carries no location
pub const DEFAULT_LATITUDE: f64 = 40.0;
/// Wind speed assumed when no observation is available (m/s)
pub const DEFAULT_WIND_SPEED: f64 = 5.0;
/// Relative humidity assumed when no observation is available (%)
pub const DEFAULT_HUMIDITY: f64 = 60.0;
/// Sea-level standard pressure (hPa)
pub const DEFAULT_PRESSURE: f64 = 1013.0;

/// Raw current conditions reported by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub temperature_c: f64,
    pub wind_speed_ms: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
}

/// Source of live weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Short identifier used in logs and status reports
    fn name(&self) -> &'static str;

    /// Fetch the current conditions at `coordinates`
    async fn current(&self, coordinates: Coordinates) -> Result<Observation>;
}

/// Resolves the weather for a single prediction request
#[derive(Clone)]
pub struct WeatherResolver {
    provider: Option<Arc<dyn WeatherProvider>>,
    timeout: Duration,
}

impl WeatherResolver {
    #[must_use]
    pub fn new(provider: Option<Arc<dyn WeatherProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Resolver that never calls out and always estimates
    #[must_use]
    pub fn estimated_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Build the resolver from configuration. An unusable provider
    /// configuration degrades to estimation instead of failing start-up.
    #[must_use]
    pub fn from_config(config: &WeatherConfig) -> Self {
        if !config.is_configured() {
            warn!("OpenWeatherMap API not configured, predictions will use estimated weather");
            return Self::new(None, config.timeout());
        }

        match OpenWeatherMapClient::new(config) {
            Ok(client) => Self::new(Some(Arc::new(client)), config.timeout()),
            Err(e) => {
                warn!("Weather provider unavailable, using estimates: {}", e);
                Self::new(None, config.timeout())
            }
        }
    }

    /// Name of the live provider, if any
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Current weather at `coordinates`, estimated for `date` when the
    /// provider cannot answer in time. Never fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, coordinates: Option<Coordinates>, date: NaiveDate) -> WeatherSnapshot {
        let latitude = coordinates.map(|c| c.latitude);

        let (Some(provider), Some(coordinates)) = (&self.provider, coordinates) else {
            debug!("No provider or no coordinates, estimating weather");
            return estimate(latitude, date);
        };

        match tokio::time::timeout(self.timeout, provider.current(coordinates)).await {
            Ok(Ok(observation)) => WeatherSnapshot {
                temperature_c: observation.temperature_c,
                wind_speed_ms: observation.wind_speed_ms,
                humidity_pct: observation.humidity_pct,
                pressure_hpa: observation.pressure_hpa,
                source: DataSource::Real,
            },
            Ok(Err(e)) => {
                warn!(provider = provider.name(), "Weather lookup failed, estimating: {}", e);
                estimate(latitude, date)
            }
            Err(_) => {
                warn!(
                    provider = provider.name(),
                    "Weather lookup timed out after {:.1}s, estimating",
                    self.timeout.as_secs_f64()
                );
                estimate(latitude, date)
            }
        }
    }
}

/// Deterministic weather estimate from latitude and season.
///
/// Surface temperature follows `15 + (60 - |lat|) / 60 * 15` plus a
/// ±10 °C seasonal sine over the day of year; wind, humidity and pressure
/// use fixed climatological values.
#[must_use]
pub fn estimate(latitude: Option<f64>, date: NaiveDate) -> WeatherSnapshot {
    let latitude = latitude.unwrap_or(DEFAULT_LATITUDE);
    let day_of_year = f64::from(date.ordinal());

    let seasonal_factor = (2.0 * PI * day_of_year / 365.0).sin() * 10.0;
    let latitude_factor = (60.0 - latitude.abs()) / 60.0 * 15.0;

    WeatherSnapshot {
        temperature_c: 15.0 + latitude_factor + seasonal_factor,
        wind_speed_ms: DEFAULT_WIND_SPEED,
        humidity_pct: DEFAULT_HUMIDITY,
        pressure_hpa: DEFAULT_PRESSURE,
        source: DataSource::Estimated,
    }
}
