use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ride_coordinator::api;
use ride_coordinator::config::Config;
use ride_coordinator::engine::fare;
use ride_coordinator::engine::seed::{load_drivers, seed_coordinator};
use ride_coordinator::error::AppError;
use ride_coordinator::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::with_fare_policy(
        config.event_buffer_size,
        fare::policy_for(config.fare_distance),
    );

    let drivers = load_drivers(&config.driver_seed_path)?;
    seed_coordinator(&app_state.coordinator, drivers).await?;

    let shared_state = Arc::new(app_state);
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "ride coordinator started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
