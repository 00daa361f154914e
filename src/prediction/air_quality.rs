//! Air quality model
//!
//! Pollution load is emission sources minus natural sinks, corrected for wind
//! dispersion and humidity, on an EPA-style AQI scale (0-300, higher is
//! worse). The same load is reported as a 0-100 quality index where higher
//! means cleaner air.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{CityConfiguration, DataSource, WeatherSnapshot};
use crate::prediction::round_to;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityCoefficients {
    pub industrial_emission: f64,
    pub building_emission: f64,
    pub traffic_emission: f64,
    pub tree_filtering: f64,
    pub vegetation_filtering: f64,
    pub water_filtering: f64,
    /// AQI points removed per m/s of effective wind
    pub dispersion_rate: f64,
    /// Wind speed (m/s) above which extra wind disperses less
    pub dispersion_threshold_speed: f64,
    /// Share of wind above the threshold that still counts
    pub dispersion_falloff: f64,
    pub humidity_reference: f64,
    pub humidity_rate: f64,
    /// Background urban pollution
    pub urban_baseline: f64,
    pub max_aqi: f64,
}

impl Default for AirQualityCoefficients {
    fn default() -> Self {
        Self {
            industrial_emission: 80.0,
            building_emission: 20.0,
            traffic_emission: 30.0,
            tree_filtering: 30.0,
            vegetation_filtering: 15.0,
            water_filtering: 10.0,
            dispersion_rate: 3.0,
            dispersion_threshold_speed: 8.0,
            dispersion_falloff: 0.25,
            humidity_reference: 50.0,
            humidity_rate: 0.2,
            urban_baseline: 20.0,
            max_aqi: 300.0,
        }
    }
}

/// AQI band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
}

impl AqiCategory {
    #[must_use]
    pub fn from_aqi(aqi: f64) -> Self {
        match aqi {
            a if a <= 50.0 => AqiCategory::Good,
            a if a <= 100.0 => AqiCategory::Moderate,
            a if a <= 150.0 => AqiCategory::UnhealthyForSensitiveGroups,
            _ => AqiCategory::Unhealthy,
        }
    }

    #[must_use]
    pub fn health_implications(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is considered satisfactory",
            AqiCategory::Moderate => "Air quality is acceptable for most people",
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects"
            }
            AqiCategory::Unhealthy => "Everyone may begin to experience health effects",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiCategory::Good => write!(f, "Good"),
            AqiCategory::Moderate => write!(f, "Moderate"),
            AqiCategory::UnhealthyForSensitiveGroups => write!(f, "Unhealthy for Sensitive Groups"),
            AqiCategory::Unhealthy => write!(f, "Unhealthy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityPrediction {
    /// EPA-style index, 0 (clean) to 300
    pub air_quality_index: f64,
    /// 0 (worst) to 100 (cleanest)
    pub quality_index: f64,
    pub category: AqiCategory,
    pub health_implications: String,
    pub pollution_sources: f64,
    pub pollution_sinks: f64,
    pub wind_effect: f64,
    pub humidity_effect: f64,
    pub recommendations: Vec<String>,
    pub data_source: DataSource,
    pub weather_conditions: WeatherSnapshot,
}

/// Wind speed that effectively disperses pollutants: linear up to the
/// threshold, damped by `dispersion_falloff` above it.
#[must_use]
pub fn effective_wind(wind_speed: f64, coefficients: &AirQualityCoefficients) -> f64 {
    let wind_speed = wind_speed.max(0.0);
    let threshold = coefficients.dispersion_threshold_speed;
    if wind_speed <= threshold {
        wind_speed
    } else {
        threshold + (wind_speed - threshold) * coefficients.dispersion_falloff
    }
}

#[must_use]
pub fn predict(
    city: &CityConfiguration,
    weather: &WeatherSnapshot,
    coefficients: &AirQualityCoefficients,
) -> AirQualityPrediction {
    let pollution_sources = city.industrial_buildings * coefficients.industrial_emission
        + city.building_density * coefficients.building_emission
        + city.traffic_density * coefficients.traffic_emission;

    let pollution_sinks = city.tree_coverage * coefficients.tree_filtering
        + city.vegetation_coverage * coefficients.vegetation_filtering
        + city.water_coverage * coefficients.water_filtering;

    let wind_effect =
        -coefficients.dispersion_rate * effective_wind(weather.wind_speed_ms, coefficients);
    let humidity_effect =
        (weather.humidity_pct - coefficients.humidity_reference) * coefficients.humidity_rate;

    let raw_aqi = pollution_sources - pollution_sinks
        + wind_effect
        + humidity_effect
        + coefficients.urban_baseline;
    let aqi = if raw_aqi.is_nan() {
        coefficients.urban_baseline
    } else {
        raw_aqi.clamp(0.0, coefficients.max_aqi)
    };

    let quality_index = if coefficients.max_aqi > 0.0 {
        100.0 * (1.0 - aqi / coefficients.max_aqi)
    } else {
        100.0
    };

    let category = AqiCategory::from_aqi(aqi);

    let mut recommendations = Vec::new();
    if aqi > 100.0 {
        recommendations.push("Increase green coverage".to_string());
        recommendations.push("Reduce industrial emissions".to_string());
    }
    if city.tree_coverage < 0.3 {
        recommendations.push("Plant more trees for air filtration".to_string());
    }
    if weather.wind_speed_ms < 2.0 {
        recommendations.push("Consider urban design to improve air circulation".to_string());
    }

    AirQualityPrediction {
        air_quality_index: round_to(aqi, 1),
        quality_index: round_to(quality_index, 1),
        category,
        health_implications: category.health_implications().to_string(),
        pollution_sources: round_to(pollution_sources, 1),
        pollution_sinks: round_to(pollution_sinks, 1),
        wind_effect: round_to(wind_effect, 1),
        humidity_effect: round_to(humidity_effect, 1),
        recommendations,
        data_source: weather.source,
        weather_conditions: weather.clone(),
    }
}
