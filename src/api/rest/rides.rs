use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::rest::observed;
use crate::error::AppError;
use crate::models::driver::Location;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rides/request", post(request_ride))
        .route("/api/rides/:id/status", get(ride_status))
        .route("/api/rides/:id/cancel", post(cancel_ride))
        .route("/api/rides/:id/accept", post(accept_ride))
        .route("/api/rides/:id/complete", post(complete_ride))
        .route("/api/rides/rider/:id/history", get(rider_history))
}

#[derive(Deserialize)]
pub struct RideRequest {
    pub rider_id: String,
    pub pickup: Location,
    pub dropoff: Location,
}

#[derive(Deserialize)]
pub struct DriverActionRequest {
    pub driver_id: String,
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RideRequest>,
) -> Result<Json<Value>, AppError> {
    let ride = observed(
        &state,
        "create_ride_request",
        state
            .coordinator
            .create_ride_request(&payload.rider_id, payload.pickup, payload.dropoff),
    )
    .await?;

    Ok(Json(json!({ "message": "Ride requested", "ride": ride })))
}

async fn ride_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ride = state.coordinator.get_ride(&id).await?;
    Ok(Json(json!({ "ride": ride })))
}

async fn cancel_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ride = observed(&state, "cancel_ride", state.coordinator.cancel_ride(&id)).await?;
    Ok(Json(json!({ "message": "Ride cancelled", "ride": ride })))
}

async fn accept_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DriverActionRequest>,
) -> Result<Json<Value>, AppError> {
    let ride = observed(
        &state,
        "accept_ride",
        state.coordinator.accept_ride(&id, &payload.driver_id),
    )
    .await?;

    Ok(Json(json!({ "message": "Ride accepted", "ride": ride })))
}

async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DriverActionRequest>,
) -> Result<Json<Value>, AppError> {
    let ride = observed(
        &state,
        "complete_ride",
        state.coordinator.complete_ride(&id, &payload.driver_id),
    )
    .await?;

    Ok(Json(json!({ "message": "Ride completed", "ride": ride })))
}

async fn rider_history(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Json<Value> {
    let rides = state.coordinator.rider_rides(&id).await;
    Json(json!({ "rides": rides }))
}
