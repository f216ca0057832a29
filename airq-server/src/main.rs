use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use airq_server::airly::{AirlyClient, AirlyConfig};
use airq_server::config::AppConfig;
use airq_server::model::{ModelConfig, SensorStationModel};
use airq_server::ratelimit::{KeyRegistry, RateLimitConfig};
use airq_server::store::MemoryStationStore;
use airq_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if config.airly_api_key.is_empty() {
        eprintln!("Warning: AIRLY_API_KEY not set. Upstream calls will fail.");
    }

    // One registry governs the credential for every concurrent caller.
    let keys = Arc::new(KeyRegistry::new(
        &config.airly_api_key,
        RateLimitConfig::new(Some(config.rate_limit_minute), Some(config.rate_limit_day)),
    ));

    let airly = Arc::new(
        AirlyClient::new(AirlyConfig::default(), keys).expect("Failed to create Airly client"),
    );

    let store = Arc::new(MemoryStationStore::new());

    let model = Arc::new(SensorStationModel::new(
        store,
        airly,
        ModelConfig {
            measurement_ttl_secs: config.measurement_ttl_secs,
            ..ModelConfig::default()
        },
    ));

    // Populate the catalog before serving; a failure here is left to the
    // periodic sync to repair.
    match model.synchronise_stations().await {
        Ok(count) => info!(count, "initial station sync complete"),
        Err(e) => error!(error = %e, "initial station sync failed"),
    }

    // Periodic catalog sync.
    {
        let model = model.clone();
        let every = Duration::from_secs(config.sync_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                match model.synchronise_stations().await {
                    Ok(count) => info!(count, "station sync complete"),
                    Err(e) => error!(error = %e, "station sync failed"),
                }
            }
        });
    }

    // Periodic purge of stations that disappeared upstream.
    {
        let model = model.clone();
        let every = Duration::from_secs(config.cleanup_interval_secs);
        let days_back = config.cleanup_days_back;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                match model.delete_old(days_back).await {
                    Ok(count) => info!(count, "stale station cleanup complete"),
                    Err(e) => error!(error = %e, "stale station cleanup failed"),
                }
            }
        });
    }

    let state = AppState::new(model);
    let app = create_router(state);

    let addr = SocketAddr::new(config.host, config.port);
    info!(%addr, "air quality server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("Server error");
}
