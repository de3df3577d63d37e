pub mod drivers;
pub mod riders;
pub mod rides;
pub mod ws;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, CoordinatorError};
use crate::observability::metrics::OUTCOME_OK;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(riders::router())
        .merge(drivers::router())
        .merge(rides::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Runs one coordinator operation and records its outcome and latency.
pub(crate) async fn observed<T, F>(
    state: &AppState,
    operation: &'static str,
    call: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, CoordinatorError>>,
{
    let start = Instant::now();
    let result = call.await;
    let outcome = match &result {
        Ok(_) => OUTCOME_OK,
        Err(err) => err.kind(),
    };
    state
        .metrics
        .observe(operation, outcome, start.elapsed().as_secs_f64());

    result.map_err(AppError::from)
}

pub(crate) fn require_id(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    drivers: usize,
    riders: usize,
    rides: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let counts = state.coordinator.counts().await;
    Json(HealthResponse {
        status: "ok",
        drivers: counts.drivers,
        riders: counts.riders,
        rides: counts.rides,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let available = state.coordinator.available_drivers().await.len();
    state.metrics.available_drivers.set(available as i64);

    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
