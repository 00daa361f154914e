//! Weather snapshot model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the weather used for a prediction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Live observation from the weather provider
    Real,
    /// Deterministic estimate, used whenever the provider is unavailable
    Estimated,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Real => write!(f, "real"),
            DataSource::Estimated => write!(f, "estimated"),
        }
    }
}

/// Weather conditions a prediction is evaluated against. Built per request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: f64,
    /// Atmospheric pressure in hPa
    pub pressure_hpa: f64,
    /// Provenance flag
    pub source: DataSource,
}

impl WeatherSnapshot {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} m/s", self.wind_speed_ms)
    }
}

impl fmt::Display for WeatherSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, wind {}, humidity {:.0}% ({})",
            self.format_temperature(),
            self.format_wind(),
            self.humidity_pct,
            self.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DataSource::Real).unwrap(), "\"real\"");
        assert_eq!(
            serde_json::to_string(&DataSource::Estimated).unwrap(),
            "\"estimated\""
        );
    }

    #[test]
    fn test_display() {
        let snapshot = WeatherSnapshot {
            temperature_c: 21.04,
            wind_speed_ms: 3.5,
            humidity_pct: 61.2,
            pressure_hpa: 1012.0,
            source: DataSource::Estimated,
        };
        assert_eq!(
            snapshot.to_string(),
            "21.0°C, wind 3.5 m/s, humidity 61% (estimated)"
        );
    }
}
