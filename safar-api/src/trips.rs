use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use safar_catalog::{validate_patch, CreateTripRequest, RoomStatusRequest};
use safar_core::{CoreError, Trip, TripFilter, TripPatch};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TripQuery {
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub trip_type: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/trips", get(list_trips).post(create_trip))
        .route("/api/trips/{id}", get(get_trip).put(update_trip).delete(delete_trip))
        .route("/api/trips/{id}/status", put(update_trip_status))
}

/// GET /api/trips?state=&type=
async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = TripFilter::new(query.state, query.trip_type);
    let trips = state.trips.list_trips(&filter).await?;
    Ok(Json(json!({ "trips": trips })))
}

/// GET /api/trips/{id}
async fn get_trip(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .get_trip(id)
        .await?
        .ok_or_else(CoreError::trip_not_found)?;
    Ok(Json(trip))
}

/// POST /api/trips
async fn create_trip(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateTripRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let new_trip = req.into_new_trip()?;
    let trip = state.trips.create_trip(new_trip).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Trip created successfully",
            "id": trip.id,
            "trip": trip,
        })),
    ))
}

/// PUT /api/trips/{id}
async fn update_trip(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<TripPatch>,
) -> Result<Json<Value>, AppError> {
    validate_patch(&patch)?;
    let trip = state.trips.update_trip(id, patch).await?;
    Ok(Json(json!({
        "message": "Trip updated successfully",
        "trip": trip,
    })))
}

/// PUT /api/trips/{id}/status
async fn update_trip_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<RoomStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let statuses = req.into_statuses()?;
    state.trips.update_room_statuses(id, statuses).await?;
    Ok(Json(json!({ "message": "Room status updated successfully" })))
}

/// DELETE /api/trips/{id}
async fn delete_trip(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Value>, AppError> {
    state.trips.delete_trip(id).await?;
    Ok(Json(json!({ "message": "Trip moved to trash" })))
}
