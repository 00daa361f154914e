//! OpenWeatherMap client
//!
//! Current conditions from the `/weather` endpoint with a client-side
//! request budget. Errors are returned to the resolver, which turns them
//! into an estimated snapshot.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::Coordinates;
use crate::weather::{Observation, WeatherProvider};
use crate::{PredictError, Result};

/// Sliding-window rate limiter for API requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per window
    max_requests: u32,
    /// Window length
    window: Duration,
    /// Request timestamps within the current window
    request_times: Vec<Instant>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests_per_minute` calls per minute
    #[must_use]
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self::with_window(max_requests_per_minute, Duration::from_secs(60))
    }

    #[must_use]
    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            request_times: Vec::new(),
        }
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        self.cleanup_old_requests();

        if self.request_times.len() >= self.max_requests as usize {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Get time until next request is allowed
    pub fn time_until_next_request(&mut self) -> Duration {
        self.cleanup_old_requests();

        if self.request_times.len() < self.max_requests as usize {
            return Duration::ZERO;
        }
        self.request_times
            .first()
            .map_or(Duration::ZERO, |oldest| {
                self.window.saturating_sub(oldest.elapsed())
            })
    }

    /// Remove requests that fell out of the window
    fn cleanup_old_requests(&mut self) {
        let window = self.window;
        self.request_times
            .retain(|time| time.elapsed() < window);
    }
}

/// `/weather` response, only the fields the models use
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainData,
    wind: WindData,
}

#[derive(Debug, Deserialize)]
struct MainData {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WindData {
    speed: f64,
}

impl From<CurrentWeatherResponse> for Observation {
    fn from(response: CurrentWeatherResponse) -> Self {
        Observation {
            temperature_c: response.main.temp,
            wind_speed_ms: response.wind.speed,
            humidity_pct: response.main.humidity,
            pressure_hpa: response.main.pressure,
        }
    }
}

/// Weather provider backed by the OpenWeatherMap REST API
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
    rate_limiter: Mutex<RateLimiter>,
}

impl OpenWeatherMapClient {
    /// Create a new client. Fails when the configuration carries no API key.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PredictError::config("OpenWeatherMap API key is not configured"))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("EnvPredict/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PredictError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            rate_limiter: Mutex::new(RateLimiter::new(config.requests_per_minute)),
        })
    }

    fn acquire_slot(&self) -> Result<()> {
        let mut limiter = self
            .rate_limiter
            .lock()
            .map_err(|_| PredictError::general("rate limiter lock poisoned"))?;

        if limiter.allow_request() {
            Ok(())
        } else {
            let wait_time = limiter.time_until_next_request();
            warn!(
                "Rate limit exceeded, next slot in {:.1}s",
                wait_time.as_secs_f64()
            );
            Err(PredictError::rate_limited(format!(
                "Please wait {} seconds.",
                wait_time.as_secs()
            )))
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn current(&self, coordinates: Coordinates) -> Result<Observation> {
        self.acquire_slot()?;

        let start_time = Instant::now();
        let url = format!("{}/weather", self.base_url);
        debug!("OpenWeatherMap request to {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                return Err(PredictError::api(
                    "Invalid API key. Please check your OpenWeatherMap API key.",
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(PredictError::rate_limited(
                    "OpenWeatherMap rejected the request (HTTP 429)",
                ));
            }
            other => {
                return Err(PredictError::api(format!(
                    "OpenWeatherMap returned HTTP {other}"
                )));
            }
        }

        let body: CurrentWeatherResponse = response.json().await.map_err(|e| {
            PredictError::api(format!(
                "Invalid weather data received from OpenWeatherMap: {}",
                e.without_url()
            ))
        })?;

        let elapsed = start_time.elapsed();
        info!(
            "Retrieved current weather for {} in {:.3}s",
            coordinates.format(),
            elapsed.as_secs_f64()
        );

        Ok(body.into())
    }
}
