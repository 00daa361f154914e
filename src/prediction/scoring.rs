//! Composite environmental score

use serde::{Deserialize, Serialize};

use crate::prediction::air_quality::AirQualityPrediction;
use crate::prediction::energy::EnergyPrediction;
use crate::prediction::round_to;
use crate::prediction::temperature::TemperaturePrediction;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub temperature_weight: f64,
    pub air_quality_weight: f64,
    pub energy_weight: f64,
    /// Centre of the 18-25 °C comfort band
    pub comfort_temperature: f64,
    /// Score points lost per °C away from comfort
    pub temperature_penalty_per_degree: f64,
    /// Score points lost per AQI point
    pub aqi_penalty_rate: f64,
    /// Heat-island intensity tolerated without penalty (°C)
    pub uhi_tolerance: f64,
    pub uhi_penalty_per_degree: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            temperature_weight: 0.30,
            air_quality_weight: 0.35,
            energy_weight: 0.35,
            comfort_temperature: 21.5,
            temperature_penalty_per_degree: 8.0,
            aqi_penalty_rate: 1.5,
            uhi_tolerance: 2.0,
            uhi_penalty_per_degree: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub overall_score: f64,
    pub temperature_score: f64,
    pub air_quality_score: f64,
    pub energy_score: f64,
    pub uhi_penalty: f64,
}

/// Clamp into the score range; NaN counts as the worst score.
fn bounded(value: f64) -> f64 {
    if value.is_nan() {
        MIN_SCORE
    } else {
        value.clamp(MIN_SCORE, MAX_SCORE)
    }
}

#[must_use]
pub fn score(
    temperature: &TemperaturePrediction,
    air_quality: &AirQualityPrediction,
    energy: &EnergyPrediction,
    weights: &ScoreWeights,
) -> CompositeScore {
    let deviation = (temperature.predicted_temperature - weights.comfort_temperature).abs();
    let temperature_score = bounded(MAX_SCORE - deviation * weights.temperature_penalty_per_degree);

    let air_quality_score =
        bounded(MAX_SCORE - air_quality.air_quality_index * weights.aqi_penalty_rate);

    let energy_score = bounded(energy.sustainability_score);

    let uhi_penalty = (temperature.uhi_intensity - weights.uhi_tolerance).max(0.0)
        * weights.uhi_penalty_per_degree;

    let weighted = temperature_score * weights.temperature_weight
        + air_quality_score * weights.air_quality_weight
        + energy_score * weights.energy_weight;
    let overall_score = bounded(weighted - uhi_penalty);

    CompositeScore {
        overall_score: round_to(overall_score, 1),
        temperature_score: round_to(temperature_score, 1),
        air_quality_score: round_to(air_quality_score, 1),
        energy_score: round_to(energy_score, 1),
        uhi_penalty: round_to(uhi_penalty, 1),
    }
}

/// City-level advice derived from the three model outputs, duplicates removed
/// and first-seen order kept.
#[must_use]
pub fn recommendations(
    temperature: &TemperaturePrediction,
    air_quality: &AirQualityPrediction,
    energy: &EnergyPrediction,
) -> Vec<String> {
    let mut advice: Vec<String> = Vec::new();

    let predicted = temperature.predicted_temperature;
    if predicted > 27.0 {
        advice.push("Critical: Add trees and green infrastructure to reduce urban heat".into());
    } else if predicted > 25.0 {
        advice.push("Add more vegetation and cooling features".into());
    }

    let aqi = air_quality.air_quality_index;
    if aqi > 150.0 {
        advice.push("Critical: Reduce pollution sources and improve air circulation".into());
    } else if aqi > 100.0 {
        advice.extend(air_quality.recommendations.iter().cloned());
    }

    if energy.renewable_percentage < 30.0 {
        advice.push("Significantly increase renewable energy infrastructure".into());
    } else if energy.renewable_percentage < 60.0 {
        advice.push("Expand solar and wind energy systems".into());
    }

    if temperature.uhi_intensity > 4.0 {
        advice.push("Implement comprehensive urban cooling strategy".into());
    }

    let mut unique = Vec::with_capacity(advice.len());
    for item in advice {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
