//! Environmental prediction pipeline
//!
//! A request flows through the normalizer and the weather resolver into the
//! three independent models (temperature, air quality, energy), whose outputs
//! the scorer folds into one composite score:
//! - `temperature`: urban heat island and diurnal temperature
//! - `air_quality`: pollution sources, sinks and wind dispersion
//! - `energy`: solar and wind generation against demand
//! - `scoring`: weighted composite score and recommendations

pub mod air_quality;
pub mod energy;
pub mod scoring;
pub mod temperature;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::models::{CityConfiguration, DataSource, WeatherSnapshot};
use crate::weather::WeatherResolver;

pub use air_quality::{AirQualityCoefficients, AirQualityPrediction, AqiCategory};
pub use energy::{EnergyCoefficients, EnergyPrediction};
pub use scoring::{CompositeScore, ScoreWeights};
pub use temperature::{TemperatureCoefficients, TemperaturePrediction};

/// Every tunable constant of the models
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCoefficients {
    pub temperature: TemperatureCoefficients,
    pub air_quality: AirQualityCoefficients,
    pub energy: EnergyCoefficients,
    pub score: ScoreWeights,
}

/// Complete environmental assessment of one city configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub temperature: TemperaturePrediction,
    pub air_quality: AirQualityPrediction,
    pub energy: EnergyPrediction,
    pub scores: CompositeScore,
    pub recommendations: Vec<String>,
    /// Provenance of the weather every model used
    pub data_source: DataSource,
}

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Run every model and the scorer against one weather snapshot. Pure.
#[must_use]
pub fn evaluate(
    city: &CityConfiguration,
    weather: &WeatherSnapshot,
    coefficients: &ModelCoefficients,
) -> PredictionResult {
    let temperature = temperature::predict(city, weather, &coefficients.temperature);
    let air_quality = air_quality::predict(city, weather, &coefficients.air_quality);
    let energy = energy::predict(city, weather, &coefficients.energy);

    let scores = scoring::score(&temperature, &air_quality, &energy, &coefficients.score);
    let recommendations = scoring::recommendations(&temperature, &air_quality, &energy);

    PredictionResult {
        temperature,
        air_quality,
        energy,
        scores,
        recommendations,
        data_source: weather.source,
    }
}

/// Request-level entry point: normalizes input, resolves weather once and
/// runs the requested model(s). Holds no per-request state.
#[derive(Clone)]
pub struct PredictionService {
    resolver: WeatherResolver,
    coefficients: ModelCoefficients,
}

impl PredictionService {
    #[must_use]
    pub fn new(resolver: WeatherResolver, coefficients: ModelCoefficients) -> Self {
        Self {
            resolver,
            coefficients,
        }
    }

    /// Normalized configuration and the weather it is evaluated against
    pub async fn prepare(&self, raw: &Value) -> (CityConfiguration, WeatherSnapshot) {
        let city = CityConfiguration::from_request(raw);
        let weather = self.weather_for(&city, Local::now().date_naive()).await;
        (city, weather)
    }

    async fn weather_for(&self, city: &CityConfiguration, date: NaiveDate) -> WeatherSnapshot {
        let weather = self.resolver.resolve(city.coordinates, date).await;
        debug!("Weather for prediction: {}", weather);
        weather
    }

    pub async fn temperature(&self, raw: &Value) -> TemperaturePrediction {
        let (city, weather) = self.prepare(raw).await;
        temperature::predict(&city, &weather, &self.coefficients.temperature)
    }

    pub async fn air_quality(&self, raw: &Value) -> AirQualityPrediction {
        let (city, weather) = self.prepare(raw).await;
        air_quality::predict(&city, &weather, &self.coefficients.air_quality)
    }

    pub async fn energy(&self, raw: &Value) -> EnergyPrediction {
        let (city, weather) = self.prepare(raw).await;
        energy::predict(&city, &weather, &self.coefficients.energy)
    }

    /// Complete assessment of a raw request body
    pub async fn complete(&self, raw: &Value) -> PredictionResult {
        let city = CityConfiguration::from_request(raw);
        self.assess(&city, Local::now().date_naive()).await
    }

    /// Complete assessment of an already normalized configuration on `date`
    #[instrument(skip(self, city), fields(hour = city.hour_of_day))]
    pub async fn assess(&self, city: &CityConfiguration, date: NaiveDate) -> PredictionResult {
        let weather = self.weather_for(city, date).await;
        let result = evaluate(city, &weather, &self.coefficients);
        info!(
            overall = result.scores.overall_score,
            data_source = %result.data_source,
            "Completed environmental assessment"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::city::normalize;
    use serde_json::json;

    fn sample_request() -> Value {
        json!({
            "concrete": 0.4,
            "vegetation": 0.3,
            "water": 0.1,
            "building_density": 0.5,
            "industrial_buildings": 0.2,
            "tree_coverage": 0.25,
            "solar_panel_coverage": 0.15,
            "wind_turbine_density": 0.05,
            "hour_of_day": 14
        })
    }

    #[rstest::rstest]
    #[case(2.346, 2, 2.35)]
    #[case(-1.25, 1, -1.3)]
    #[case(88.000_000_000_01, 1, 88.0)]
    fn test_round_to(#[case] value: f64, #[case] decimals: i32, #[case] expected: f64) {
        assert!((round_to(value, decimals) - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sample_city_without_coordinates_is_estimated() {
        let service = PredictionService::new(
            WeatherResolver::estimated_only(),
            ModelCoefficients::default(),
        );
        let city = normalize(&sample_request(), 9);
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let result = service.assess(&city, date).await;

        assert_eq!(result.data_source, DataSource::Estimated);
        assert_eq!(result.temperature.data_source, DataSource::Estimated);
        assert!(result.temperature.predicted_temperature.is_finite());
        assert_eq!(result.temperature.uhi_intensity, 2.1);
        assert!((0.0..=300.0).contains(&result.air_quality.air_quality_index));
        assert!((0.0..=100.0).contains(&result.air_quality.quality_index));
        assert!(result.energy.total_production >= 0.0);
        assert!((0.0..=100.0).contains(&result.energy.sustainability_score));
        assert!((0.0..=100.0).contains(&result.scores.overall_score));
    }

    #[test]
    fn test_evaluate_shares_one_snapshot() {
        let city = normalize(&sample_request(), 9);
        let weather = crate::weather::estimate(None, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        let result = evaluate(&city, &weather, &ModelCoefficients::default());
        assert_eq!(result.temperature.weather_conditions, weather);
        assert_eq!(result.air_quality.weather_conditions, weather);
        assert_eq!(result.energy.weather_conditions, weather);
    }
}
