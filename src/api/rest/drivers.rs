use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::rest::{observed, require_id};
use crate::error::AppError;
use crate::models::driver::{Driver, Location};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/drivers/signup", post(driver_signup))
        .route("/api/drivers/:id/location", post(update_driver_location))
        .route("/api/drivers/:id/rides", get(driver_rides))
        .route("/api/drivers/available-rides", get(available_rides))
        .route("/api/drivers/available-drivers", get(available_drivers))
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: Location,
}

async fn driver_signup(
    State(state): State<Arc<AppState>>,
    Json(driver): Json<Driver>,
) -> Result<Json<Value>, AppError> {
    require_id("id", &driver.id)?;

    let created =
        observed(&state, "create_driver", state.coordinator.create_driver(driver)).await?;
    Ok(Json(json!({ "message": "Driver created", "driver": created })))
}

async fn update_driver_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Value>, AppError> {
    let driver = observed(
        &state,
        "update_driver_location",
        state.coordinator.update_driver_location(&id, payload.location),
    )
    .await?;

    Ok(Json(json!({ "message": "Location updated", "driver": driver })))
}

async fn driver_rides(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Json<Value> {
    let rides = state.coordinator.driver_rides(&id).await;
    Json(json!({ "rides": rides }))
}

async fn available_rides(State(state): State<Arc<AppState>>) -> Json<Value> {
    let rides = state.coordinator.available_rides().await;
    Json(json!({ "rides": rides }))
}

async fn available_drivers(State(state): State<Arc<AppState>>) -> Json<Value> {
    let drivers = state.coordinator.available_drivers().await;
    Json(json!({ "drivers": drivers }))
}
