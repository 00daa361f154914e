//! Temperature model
//!
//! Predicted air temperature is the base (observed or estimated) weather
//! temperature shifted by the urban heat island, wind cooling and a diurnal
//! curve. Coefficients follow published urban climate studies; they are
//! fixed values, configurable but never fitted.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::models::{CityConfiguration, DataSource, WeatherSnapshot};
use crate::prediction::round_to;

/// Heat-island, cooling and diurnal coefficients (°C per unit fraction)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureCoefficients {
    pub concrete_heating: f64,
    pub building_heating: f64,
    pub industrial_heating: f64,
    pub tree_cooling: f64,
    pub vegetation_cooling: f64,
    pub water_cooling: f64,
    /// °C removed per m/s of wind above the threshold
    pub wind_cooling_rate: f64,
    /// Wind speed (m/s) at or below which wind has no cooling effect
    pub wind_cooling_threshold: f64,
    /// Half of the daily temperature swing (°C)
    pub diurnal_amplitude: f64,
    /// Hour of the daily maximum
    pub diurnal_peak_hour: f64,
    pub real_confidence: f64,
    pub estimated_confidence: f64,
}

impl Default for TemperatureCoefficients {
    fn default() -> Self {
        Self {
            concrete_heating: 3.5,
            building_heating: 2.0,
            industrial_heating: 4.0,
            tree_cooling: 2.0,
            vegetation_cooling: 1.0,
            water_cooling: 3.0,
            wind_cooling_rate: 0.3,
            wind_cooling_threshold: 2.0,
            diurnal_amplitude: 2.0,
            diurnal_peak_hour: 15.0,
            real_confidence: 0.90,
            estimated_confidence: 0.75,
        }
    }
}

/// Individual contributions to the predicted temperature. Cooling terms are
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureFactors {
    pub base_temperature: f64,
    pub uhi_effect: f64,
    pub concrete_heating: f64,
    pub building_heating: f64,
    pub industrial_heating: f64,
    pub tree_cooling: f64,
    pub vegetation_cooling: f64,
    pub water_cooling: f64,
    pub wind_cooling: f64,
    pub daily_variation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePrediction {
    /// Predicted temperature in Celsius
    pub predicted_temperature: f64,
    pub base_temperature: f64,
    /// Net heat-island effect in °C (heating minus cooling)
    pub uhi_intensity: f64,
    pub data_source: DataSource,
    pub confidence: f64,
    pub factors: TemperatureFactors,
    pub weather_conditions: WeatherSnapshot,
}

/// Diurnal temperature adjustment for `hour`: cosine peaking at
/// `diurnal_peak_hour` with its trough twelve hours earlier.
#[must_use]
pub fn daily_variation(hour: u8, coefficients: &TemperatureCoefficients) -> f64 {
    let phase = 2.0 * PI * (f64::from(hour) - coefficients.diurnal_peak_hour) / 24.0;
    coefficients.diurnal_amplitude * phase.cos()
}

#[must_use]
pub fn predict(
    city: &CityConfiguration,
    weather: &WeatherSnapshot,
    coefficients: &TemperatureCoefficients,
) -> TemperaturePrediction {
    let base_temperature = weather.temperature_c;

    let concrete_heating = city.concrete_coverage * coefficients.concrete_heating;
    let building_heating = city.building_density * coefficients.building_heating;
    let industrial_heating = city.industrial_buildings * coefficients.industrial_heating;
    let tree_cooling = -city.tree_coverage * coefficients.tree_cooling;
    let vegetation_cooling = -city.vegetation_coverage * coefficients.vegetation_cooling;
    let water_cooling = -city.water_coverage * coefficients.water_cooling;

    let uhi_effect = concrete_heating
        + building_heating
        + industrial_heating
        + tree_cooling
        + vegetation_cooling
        + water_cooling;

    let wind_speed = weather.wind_speed_ms.max(0.0);
    let wind_cooling = if wind_speed > coefficients.wind_cooling_threshold {
        -coefficients.wind_cooling_rate * wind_speed
    } else {
        0.0
    };

    let daily_variation = daily_variation(city.hour_of_day, coefficients);
    let predicted = base_temperature + uhi_effect + wind_cooling + daily_variation;

    let confidence = match weather.source {
        DataSource::Real => coefficients.real_confidence,
        DataSource::Estimated => coefficients.estimated_confidence,
    };

    TemperaturePrediction {
        predicted_temperature: round_to(predicted, 2),
        base_temperature: round_to(base_temperature, 2),
        uhi_intensity: round_to(uhi_effect, 2),
        data_source: weather.source,
        confidence,
        factors: TemperatureFactors {
            base_temperature,
            uhi_effect,
            concrete_heating,
            building_heating,
            industrial_heating,
            tree_cooling,
            vegetation_cooling,
            water_cooling,
            wind_cooling,
            daily_variation,
        },
        weather_conditions: weather.clone(),
    }
}
