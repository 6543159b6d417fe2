use pm_config::Config;
use pm_core::telemetry;
use pm_db::Db;
use pm_load::LoadDriver;
use pm_obs::{Metrics, ObsState};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let env = std::env::var("PROMYSQL_ENV").unwrap_or_else(|_| "development".to_string());
    telemetry::init_tracing(&env, "promysql");
    tracing::info!("promysql starting");

    let config = match Config::load() {
        Ok(config) => {
            tracing::debug!(?config, "Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    tracing::info!(
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.name,
        sleep_interval_ms = config.load.sleep_interval_ms,
        metrics_addr = %config.server.metrics_addr,
        "Application configured"
    );

    let metrics = match Metrics::new() {
        Ok(metrics) => Arc::new(metrics),
        Err(e) => {
            tracing::error!("Failed to register metrics: {}", e);
            process::exit(1);
        }
    };

    let db = match Db::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = db.health_check().await {
        tracing::error!("Database health check failed: {}", e);
        process::exit(1);
    }

    let obs_state = ObsState::new(metrics.clone());
    let readiness = obs_state.readiness.clone();

    let mut driver = LoadDriver::new(Arc::new(db), metrics, config.load.sleep_interval());

    let obs_future = pm_obs::start_server(&config.server.metrics_addr, obs_state);
    let load_future = async move {
        driver.initialize().await?;
        readiness.set_ready(true);
        driver.run().await;
        Ok::<(), pm_core::Error>(())
    };

    // Neither side returns during normal operation
    let result = tokio::select! {
        obs_result = obs_future => {
            tracing::error!("Metrics server exited");
            obs_result
        }
        load_result = load_future => {
            tracing::error!("Load driver exited");
            load_result
        }
    };

    if let Err(e) = result {
        tracing::error!("Fatal error: {}", e);
        process::exit(1);
    }
}
