//! Error types and handling for the `EnvPredict` service

use thiserror::Error;

/// Main error type for the `EnvPredict` service
#[derive(Error, Debug)]
pub enum PredictError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather provider communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Weather provider refused the call because of its request budget
    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl PredictError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new rate limit error
    pub fn rate_limited<S: Into<String>>(message: S) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }
}

/// The request URL carries the API key in its query, so it never reaches the message.
impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            PredictError::api(format!("request timed out: {err}"))
        } else {
            PredictError::api(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = PredictError::config("missing API key");
        assert!(matches!(config_err, PredictError::Config { .. }));

        let api_err = PredictError::api("connection failed");
        assert!(matches!(api_err, PredictError::Api { .. }));

        let limited = PredictError::rate_limited("60 requests per minute");
        assert!(matches!(limited, PredictError::RateLimited { .. }));
    }

    #[test]
    fn test_display_carries_message() {
        let err = PredictError::api("OpenWeatherMap returned HTTP 503");
        assert_eq!(err.to_string(), "API error: OpenWeatherMap returned HTTP 503");

        let err = PredictError::general("rate limiter lock poisoned");
        assert_eq!(err.to_string(), "Application error: rate limiter lock poisoned");
    }
}
