use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_json::{json, Value};

use crate::api::rest::{observed, require_id};
use crate::error::AppError;
use crate::models::rider::Rider;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/rides/signup", post(rider_signup))
}

async fn rider_signup(
    State(state): State<Arc<AppState>>,
    Json(rider): Json<Rider>,
) -> Result<Json<Value>, AppError> {
    require_id("id", &rider.id)?;

    let created = observed(&state, "create_rider", state.coordinator.create_rider(rider)).await?;
    Ok(Json(json!({ "message": "Rider created", "rider": created })))
}
