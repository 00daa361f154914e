use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use envpredict::api::AppState;
use envpredict::{PredictConfig, PredictionService, WeatherResolver, logging, web};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = PredictConfig::load_from_path(args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    logging::init(&config.logging);

    tracing::info!("Starting environmental prediction service v{}", envpredict::VERSION);
    if config.weather.is_configured() {
        tracing::info!("OpenWeatherMap API configured");
    } else {
        tracing::warn!(
            "OpenWeatherMap API not configured, using estimated weather. Set OPENWEATHER_API_KEY for real weather data"
        );
    }
    if !config.satellite.is_configured() {
        tracing::info!("NASA Earthdata not configured, land surface temperature is estimated");
    }

    let resolver = WeatherResolver::from_config(&config.weather);
    let service = PredictionService::new(resolver, config.model.clone());
    let state = AppState::new(service, &config);

    web::run(state, &config).await
}
