//! Energy balance model
//!
//! Renewable generation (solar by time of day, wind by the cubic power law
//! capped at the turbine's rated speed) against a time-of-day demand profile.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::models::{CityConfiguration, DataSource, WeatherSnapshot};
use crate::prediction::round_to;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyCoefficients {
    /// Output of full solar coverage at peak irradiance (kWh)
    pub solar_capacity: f64,
    /// Output of full turbine density at rated wind (kWh)
    pub wind_capacity: f64,
    pub daylight_start_hour: f64,
    pub daylight_end_hour: f64,
    /// Wind speed (m/s) below which turbines produce nothing
    pub wind_cut_in_speed: f64,
    /// Wind speed (m/s) at which turbines reach full output
    pub wind_rated_speed: f64,
    pub building_demand: f64,
    pub industrial_demand: f64,
    pub residential_demand: f64,
}

impl Default for EnergyCoefficients {
    fn default() -> Self {
        Self {
            solar_capacity: 100.0,
            wind_capacity: 150.0,
            daylight_start_hour: 6.0,
            daylight_end_hour: 18.0,
            wind_cut_in_speed: 3.0,
            wind_rated_speed: 12.0,
            building_demand: 80.0,
            industrial_demand: 200.0,
            residential_demand: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyPrediction {
    /// Production minus consumption (kWh)
    pub energy_balance: f64,
    pub total_production: f64,
    pub solar_production: f64,
    pub wind_production: f64,
    pub total_consumption: f64,
    pub renewable_percentage: f64,
    /// 0-100
    pub sustainability_score: f64,
    /// Percent of peak solar output available at this hour
    pub solar_efficiency: f64,
    /// Percent of rated wind output available at this wind speed
    pub wind_efficiency: f64,
    pub consumption_multiplier: f64,
    pub data_source: DataSource,
    pub weather_conditions: WeatherSnapshot,
}

/// Fraction of peak irradiance at `hour`: a half sine over daylight hours,
/// maximal at solar noon, zero at night.
#[must_use]
pub fn solar_efficiency(hour: u8, coefficients: &EnergyCoefficients) -> f64 {
    let hour = f64::from(hour);
    let start = coefficients.daylight_start_hour;
    let end = coefficients.daylight_end_hour;
    if hour < start || hour > end || end <= start {
        return 0.0;
    }
    (PI * (hour - start) / (end - start)).sin().max(0.0)
}

/// Fraction of rated turbine output at `wind_speed`. Zero below cut-in,
/// cubic up to the rated speed, flat above it.
#[must_use]
pub fn wind_efficiency(wind_speed: f64, coefficients: &EnergyCoefficients) -> f64 {
    let wind_speed = wind_speed.max(0.0);
    if wind_speed < coefficients.wind_cut_in_speed {
        return 0.0;
    }
    (wind_speed / coefficients.wind_rated_speed).powi(3).min(1.0)
}

/// Demand multiplier for the hour: evening peak, morning peak, daytime, night
#[must_use]
pub fn consumption_multiplier(hour: u8) -> f64 {
    match hour {
        18..=22 => 1.3,
        6..=9 => 1.2,
        10..=16 => 1.1,
        _ => 0.8,
    }
}

#[must_use]
pub fn predict(
    city: &CityConfiguration,
    weather: &WeatherSnapshot,
    coefficients: &EnergyCoefficients,
) -> EnergyPrediction {
    let solar_efficiency = solar_efficiency(city.hour_of_day, coefficients);
    let wind_efficiency = wind_efficiency(weather.wind_speed_ms, coefficients);

    let solar_production = city.solar_panel_coverage * coefficients.solar_capacity * solar_efficiency;
    let wind_production = city.wind_turbine_density * coefficients.wind_capacity * wind_efficiency;
    let total_production = solar_production + wind_production;

    let base_consumption = city.building_density * coefficients.building_demand
        + city.industrial_buildings * coefficients.industrial_demand
        + city.residential_buildings * coefficients.residential_demand;
    let multiplier = consumption_multiplier(city.hour_of_day);
    let total_consumption = base_consumption * multiplier;

    let energy_balance = total_production - total_consumption;
    let renewable_percentage = if total_consumption > 0.0 {
        total_production / total_consumption * 100.0
    } else {
        0.0
    };

    let surplus_bonus = if energy_balance >= 0.0 { 50.0 } else { 0.0 };
    let efficiency = 100.0 - energy_balance.abs() / total_consumption.max(1.0) * 100.0;
    let sustainability_score =
        (renewable_percentage * 0.6 + surplus_bonus * 0.3 + efficiency * 0.1).clamp(0.0, 100.0);

    EnergyPrediction {
        energy_balance: round_to(energy_balance, 1),
        total_production: round_to(total_production, 1),
        solar_production: round_to(solar_production, 1),
        wind_production: round_to(wind_production, 1),
        total_consumption: round_to(total_consumption, 1),
        renewable_percentage: round_to(renewable_percentage, 1),
        sustainability_score: round_to(sustainability_score, 1),
        solar_efficiency: round_to(solar_efficiency * 100.0, 1),
        wind_efficiency: round_to(wind_efficiency * 100.0, 1),
        consumption_multiplier: multiplier,
        data_source: weather.source,
        weather_conditions: weather.clone(),
    }
}
