use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::PredictConfig;
use crate::prediction::{
    AirQualityPrediction, EnergyPrediction, PredictionResult, PredictionService,
    TemperaturePrediction,
};

pub mod error;

pub use error::AppError;

const SERVICE_NAME: &str = "Environmental Prediction API";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub weather_configured: bool,
    pub satellite_configured: bool,
}

impl AppState {
    #[must_use]
    pub fn new(service: PredictionService, config: &PredictConfig) -> Self {
        Self {
            service: Arc::new(service),
            weather_configured: config.weather.is_configured(),
            satellite_configured: config.satellite.is_configured(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiStatus {
    pub openweathermap: String,
    pub nasa_earthdata: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub external_apis: ApiStatus,
    pub capabilities: Vec<String>,
}

fn configured(flag: bool) -> String {
    let status = if flag { "configured" } else { "not_configured" };
    status.to_string()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict/temperature", post(predict_temperature))
        .route("/predict/air_quality", post(predict_air_quality))
        .route("/predict/energy", post(predict_energy))
        .route("/predict/complete", post(predict_complete))
        .route("/data/sources", get(data_sources))
        .route("/api/docs", get(api_docs))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        service: SERVICE_NAME.to_string(),
        external_apis: ApiStatus {
            openweathermap: configured(state.weather_configured),
            nasa_earthdata: configured(state.satellite_configured),
        },
        capabilities: ["temperature", "air_quality", "energy", "real_time_weather", "satellite_data"]
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

async fn predict_temperature(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TemperaturePrediction>, AppError> {
    let Json(raw) = payload?;
    Ok(Json(state.service.temperature(&raw).await))
}

async fn predict_air_quality(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AirQualityPrediction>, AppError> {
    let Json(raw) = payload?;
    Ok(Json(state.service.air_quality(&raw).await))
}

async fn predict_energy(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EnergyPrediction>, AppError> {
    let Json(raw) = payload?;
    Ok(Json(state.service.energy(&raw).await))
}

async fn predict_complete(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    let Json(raw) = payload?;
    Ok(Json(state.service.complete(&raw).await))
}

async fn data_sources(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "real_time_sources": {
            "openweathermap": {
                "status": configured(state.weather_configured),
                "provides": ["temperature", "humidity", "wind_speed", "pressure"],
                "update_frequency": "10 minutes",
                "coverage": "global"
            },
            "nasa_earthdata": {
                "status": configured(state.satellite_configured),
                "provides": ["land_surface_temperature"],
                "mode": "estimated",
                "coverage": "global",
                "satellites": ["VIIRS"]
            }
        },
        "fallback": "Deterministic latitude and seasonal estimate, reported as data_source \"estimated\"",
        "models": {
            "temperature": "Urban heat island coefficients with wind cooling and a diurnal curve",
            "air_quality": "Emission sources and natural sinks with wind dispersion and humidity",
            "energy": "Solar irradiance curve and capped cubic wind power law against demand"
        }
    }))
}

async fn api_docs() -> Json<Value> {
    let city_fields = [
        "concrete_coverage",
        "vegetation_coverage",
        "water_coverage",
        "tree_coverage",
        "building_density",
        "industrial_buildings",
        "solar_panel_coverage",
        "wind_turbine_density",
        "traffic_density",
        "residential_buildings",
        "latitude",
        "longitude",
        "hour_of_day",
    ];

    Json(json!({
        "title": SERVICE_NAME,
        "version": crate::VERSION,
        "description": "Predicts temperature, air quality and renewable energy effects of a city layout",
        "endpoints": {
            "/health": { "method": "GET", "description": "Health check with external API status" },
            "/predict/temperature": { "method": "POST", "description": "Temperature prediction with urban heat island breakdown" },
            "/predict/air_quality": { "method": "POST", "description": "Air quality prediction with wind dispersion" },
            "/predict/energy": { "method": "POST", "description": "Weather-dependent renewable energy balance" },
            "/predict/complete": { "method": "POST", "description": "All predictions plus composite score" },
            "/data/sources": { "method": "GET", "description": "Data sources and their status" },
            "/api/docs": { "method": "GET", "description": "This document" }
        },
        "accepted_fields": city_fields,
        "notes": [
            "Fractions are clamped to [0, 1]; missing fields default to 0",
            "hour_of_day defaults to the current local hour",
            "Without latitude and longitude the weather is estimated"
        ],
        "sample_request": {
            "concrete_coverage": 0.4,
            "vegetation_coverage": 0.3,
            "water_coverage": 0.1,
            "building_density": 0.5,
            "industrial_buildings": 0.2,
            "tree_coverage": 0.25,
            "solar_panel_coverage": 0.15,
            "wind_turbine_density": 0.05,
            "latitude": 40.7128,
            "longitude": -74.0060,
            "hour_of_day": 14
        }
    }))
}
