//! HTTP-level tests for the prediction API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use envpredict::api::AppState;
use envpredict::weather::Observation;
use envpredict::{
    Coordinates, PredictConfig, PredictError, PredictionService, WeatherProvider, WeatherResolver,
    web,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct StaticProvider;

#[async_trait]
impl WeatherProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn current(&self, _coordinates: Coordinates) -> envpredict::Result<Observation> {
        Ok(Observation {
            temperature_c: 24.0,
            wind_speed_ms: 6.0,
            humidity_pct: 55.0,
            pressure_hpa: 1011.0,
        })
    }
}

struct DownProvider;

#[async_trait]
impl WeatherProvider for DownProvider {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn current(&self, _coordinates: Coordinates) -> envpredict::Result<Observation> {
        Err(PredictError::api("network unreachable"))
    }
}

fn app_with(resolver: WeatherResolver) -> Router {
    let config = PredictConfig::default();
    let service = PredictionService::new(resolver, config.model.clone());
    web::app(AppState::new(service, &config), &config)
}

fn estimated_app() -> Router {
    app_with(WeatherResolver::estimated_only())
}

fn provider_app(provider: Arc<dyn WeatherProvider>) -> Router {
    app_with(WeatherResolver::new(Some(provider), Duration::from_secs(2)))
}

fn sample_city() -> Value {
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

async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn in_range(value: &Value, min: f64, max: f64) -> bool {
    value.as_f64().is_some_and(|v| (min..=max).contains(&v))
}

#[tokio::test]
async fn test_health_reports_unconfigured_apis() {
    let (status, body) = get_json(estimated_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], envpredict::VERSION);
    assert_eq!(body["external_apis"]["openweathermap"], "not_configured");
}

#[tokio::test]
async fn test_complete_without_coordinates_is_estimated() {
    let (status, body) =
        post_json(estimated_app(), "/predict/complete", sample_city().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "estimated");
    assert!(body["temperature"]["predicted_temperature"].is_number());
    assert_eq!(body["temperature"]["uhi_intensity"], 2.1);
    assert!(in_range(&body["air_quality"]["air_quality_index"], 0.0, 300.0));
    assert!(in_range(&body["air_quality"]["quality_index"], 0.0, 100.0));
    assert!(in_range(&body["energy"]["sustainability_score"], 0.0, 100.0));
    assert!(in_range(&body["scores"]["overall_score"], 0.0, 100.0));
    assert!(body["recommendations"].is_array());
}

#[tokio::test]
async fn test_complete_with_live_weather_is_real() {
    let mut city = sample_city();
    city["latitude"] = json!(40.7128);
    city["longitude"] = json!(-74.006);

    let (status, body) =
        post_json(provider_app(Arc::new(StaticProvider)), "/predict/complete", city.to_string())
            .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "real");
    assert_eq!(body["temperature"]["base_temperature"], 24.0);
    assert_eq!(body["temperature"]["confidence"], 0.9);
}

#[tokio::test]
async fn test_provider_failure_falls_back() {
    let mut city = sample_city();
    city["latitude"] = json!(51.5);
    city["longitude"] = json!(-0.12);

    let (status, body) =
        post_json(provider_app(Arc::new(DownProvider)), "/predict/temperature", city.to_string())
            .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "estimated");
    assert_eq!(body["confidence"], 0.75);
}

#[tokio::test]
async fn test_individual_models() {
    let (status, body) =
        post_json(estimated_app(), "/predict/air_quality", sample_city().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["category"].is_string());
    assert_eq!(body["data_source"], "estimated");

    let (status, body) =
        post_json(estimated_app(), "/predict/energy", sample_city().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["consumption_multiplier"], 1.1);
    assert!(body["total_production"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_out_of_range_values_are_clamped_not_rejected() {
    let body = json!({
        "concrete_coverage": 12.0,
        "tree_coverage": -4,
        "industrial_buildings": "lots",
        "hour_of_day": 99,
        "unknown": true
    });
    let (status, body) = post_json(estimated_app(), "/predict/complete", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    // concrete clamped to 1.0 gives 3.5 °C of heating
    assert_eq!(body["temperature"]["factors"]["concrete_heating"], 3.5);
    assert_eq!(body["temperature"]["factors"]["tree_cooling"], 0.0);
    assert_eq!(body["energy"]["consumption_multiplier"], 0.8);
    assert!(in_range(&body["scores"]["overall_score"], 0.0, 100.0));
}

#[tokio::test]
async fn test_unparseable_body_is_bad_request() {
    let (status, body) =
        post_json(estimated_app(), "/predict/complete", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_docs_and_sources() {
    let (status, docs) = get_json(estimated_app(), "/api/docs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(docs["endpoints"]["/predict/complete"].is_object());
    assert_eq!(docs["sample_request"]["hour_of_day"], 14);

    let (status, sources) = get_json(estimated_app(), "/data/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sources["real_time_sources"]["openweathermap"]["status"],
        "not_configured"
    );
}

fn oversized_city() -> String {
    let mut city = sample_city();
    city["padding"] = json!("x".repeat(70 * 1024));
    city.to_string()
}

#[tokio::test]
async fn test_oversized_streamed_body_is_rejected() {
    let (status, body) = post_json(estimated_app(), "/predict/complete", oversized_city()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_oversized_declared_length_is_rejected() {
    let body = oversized_city();
    let request = Request::builder()
        .method("POST")
        .uri("/predict/complete")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let response = estimated_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
