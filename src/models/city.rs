//! City configuration model and request normalization
//!
//! Requests arrive as loosely typed JSON. Everything is coerced into a
//! [`CityConfiguration`] whose land-use fractions are always inside `[0, 1]`;
//! malformed values fall back to safe defaults instead of failing the request.

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geographic position of the assessed city
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Format location as coordinates string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Land-use composition of a city plus where and when it is evaluated
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityConfiguration {
    pub concrete_coverage: f64,
    pub vegetation_coverage: f64,
    pub water_coverage: f64,
    pub tree_coverage: f64,
    pub building_density: f64,
    pub industrial_buildings: f64,
    pub solar_panel_coverage: f64,
    pub wind_turbine_density: f64,
    pub traffic_density: f64,
    pub residential_buildings: f64,
    /// Present only when both latitude and longitude were supplied
    pub coordinates: Option<Coordinates>,
    /// Local hour, 0-23
    pub hour_of_day: u8,
}

impl Default for CityConfiguration {
    fn default() -> Self {
        Self {
            concrete_coverage: 0.0,
            vegetation_coverage: 0.0,
            water_coverage: 0.0,
            tree_coverage: 0.0,
            building_density: 0.0,
            industrial_buildings: 0.0,
            solar_panel_coverage: 0.0,
            wind_turbine_density: 0.0,
            traffic_density: 0.0,
            residential_buildings: 0.0,
            coordinates: None,
            hour_of_day: 12,
        }
    }
}

impl CityConfiguration {
    /// Normalize a request body, using the current local hour when the
    /// request does not name one.
    #[must_use]
    pub fn from_request(raw: &Value) -> Self {
        // chrono's hour() is always < 24
        let current_hour = u8::try_from(Local::now().hour()).unwrap_or(12);
        normalize(raw, current_hour)
    }
}

/// Coerce a raw parameter mapping into a [`CityConfiguration`].
///
/// Recognised keys are read as floats and clamped, unknown keys are ignored
/// and a non-object value yields the default configuration. Never fails.
#[must_use]
pub fn normalize(raw: &Value, current_hour: u8) -> CityConfiguration {
    let empty = Map::new();
    let params = raw.as_object().unwrap_or(&empty);

    let fraction = |keys: &[&str]| -> f64 {
        keys.iter()
            .find_map(|key| params.get(*key).and_then(coerce_f64))
            .map_or(0.0, clamp_fraction)
    };

    let latitude = params
        .get("latitude")
        .and_then(coerce_f64)
        .map(|lat| lat.clamp(-90.0, 90.0));
    let longitude = params
        .get("longitude")
        .and_then(coerce_f64)
        .map(|lon| lon.clamp(-180.0, 180.0));
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let hour_of_day = params
        .get("hour_of_day")
        .and_then(coerce_f64)
        .map_or(current_hour.min(23), clamp_hour);

    CityConfiguration {
        concrete_coverage: fraction(&["concrete_coverage", "concrete"]),
        vegetation_coverage: fraction(&["vegetation_coverage", "vegetation"]),
        water_coverage: fraction(&["water_coverage", "water"]),
        tree_coverage: fraction(&["tree_coverage"]),
        building_density: fraction(&["building_density"]),
        industrial_buildings: fraction(&["industrial_buildings"]),
        solar_panel_coverage: fraction(&["solar_panel_coverage"]),
        wind_turbine_density: fraction(&["wind_turbine_density"]),
        traffic_density: fraction(&["traffic_density"]),
        residential_buildings: fraction(&["residential_buildings"]),
        coordinates,
        hour_of_day,
    }
}

/// Read a JSON value as a finite float. Numeric strings and booleans are
/// accepted, everything else is treated as absent.
fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn clamp_fraction(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_hour(value: f64) -> u8 {
    // clamped first, so the cast cannot truncate
    value.floor().clamp(0.0, 23.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(1.7), 1.0)]
    #[case(json!(-0.4), 0.0)]
    #[case(json!(0.35), 0.35)]
    #[case(json!("0.5"), 0.5)]
    #[case(json!("lots"), 0.0)]
    #[case(json!(null), 0.0)]
    #[case(json!([0.2]), 0.0)]
    #[case(json!(true), 1.0)]
    fn test_fraction_is_coerced_and_clamped(#[case] raw: Value, #[case] expected: f64) {
        let config = normalize(&json!({ "concrete_coverage": raw }), 9);
        assert_eq!(config.concrete_coverage, expected);
    }

    #[test]
    fn test_all_fractions_clamped() {
        let raw = json!({
            "concrete_coverage": 4.0,
            "vegetation_coverage": -3.0,
            "water_coverage": 1e9,
            "tree_coverage": -0.01,
            "building_density": 2,
            "industrial_buildings": 1.01,
            "solar_panel_coverage": -7,
            "wind_turbine_density": 99,
            "traffic_density": 5.5,
            "residential_buildings": -1.5
        });
        let config = normalize(&raw, 12);
        let fractions = [
            config.concrete_coverage,
            config.vegetation_coverage,
            config.water_coverage,
            config.tree_coverage,
            config.building_density,
            config.industrial_buildings,
            config.solar_panel_coverage,
            config.wind_turbine_density,
            config.traffic_density,
            config.residential_buildings,
        ];
        assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        assert_eq!(config.concrete_coverage, 1.0);
        assert_eq!(config.vegetation_coverage, 0.0);
    }

    #[test]
    fn test_short_key_aliases() {
        let config = normalize(&json!({ "concrete": 0.4, "vegetation": 0.3, "water": 0.1 }), 0);
        assert_eq!(config.concrete_coverage, 0.4);
        assert_eq!(config.vegetation_coverage, 0.3);
        assert_eq!(config.water_coverage, 0.1);
    }

    #[test]
    fn test_missing_keys_default_to_zero() {
        let config = normalize(&json!({ "unknown_key": 0.9 }), 7);
        assert_eq!(config.tree_coverage, 0.0);
        assert_eq!(config.solar_panel_coverage, 0.0);
        assert!(config.coordinates.is_none());
        assert_eq!(config.hour_of_day, 7);
    }

    #[rstest]
    #[case(json!(14), 14)]
    #[case(json!(-5), 0)]
    #[case(json!(30), 23)]
    #[case(json!(13.9), 13)]
    #[case(json!("22"), 22)]
    fn test_hour_is_clamped(#[case] raw: Value, #[case] expected: u8) {
        let config = normalize(&json!({ "hour_of_day": raw }), 3);
        assert_eq!(config.hour_of_day, expected);
    }

    #[test]
    fn test_malformed_hour_uses_current_hour() {
        let config = normalize(&json!({ "hour_of_day": "noon" }), 16);
        assert_eq!(config.hour_of_day, 16);
    }

    #[test]
    fn test_coordinates_require_both_values() {
        let only_lat = normalize(&json!({ "latitude": 40.7 }), 12);
        assert!(only_lat.coordinates.is_none());

        let both = normalize(&json!({ "latitude": 140.0, "longitude": -74.0 }), 12);
        let coordinates = both.coordinates.unwrap();
        assert_eq!(coordinates.latitude, 90.0);
        assert_eq!(coordinates.longitude, -74.0);
    }

    #[test]
    fn test_non_object_body_is_default() {
        let config = normalize(&json!([1, 2, 3]), 5);
        assert_eq!(
            config,
            CityConfiguration {
                hour_of_day: 5,
                ..CityConfiguration::default()
            }
        );
    }
}
