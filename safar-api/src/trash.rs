use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use crate::error::AppError;
use crate::extract::AppPath;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/trash/trips", get(list_trashed_trips))
        .route("/api/trash/trips/{id}/restore", post(restore_trip))
        .route("/api/trash/trips/{id}/permanent", delete(purge_trip))
        .route("/api/trash/bookings", get(list_trashed_bookings))
        .route("/api/trash/bookings/{id}/restore", post(restore_booking))
        .route("/api/trash/bookings/{id}/permanent", delete(purge_booking))
}

/// GET /api/trash/trips
async fn list_trashed_trips(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let trips = state.trips.list_trashed_trips().await?;
    Ok(Json(json!({ "trips": trips })))
}

/// GET /api/trash/bookings
async fn list_trashed_bookings(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let bookings = state.bookings.list_trashed_bookings().await?;
    Ok(Json(json!({ "bookings": bookings })))
}

/// POST /api/trash/trips/{id}/restore
async fn restore_trip(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Value>, AppError> {
    state.trips.restore_trip(id).await?;
    Ok(Json(json!({ "message": "Trip restored successfully" })))
}

/// DELETE /api/trash/trips/{id}/permanent
async fn purge_trip(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Value>, AppError> {
    state.trips.purge_trip(id).await?;
    Ok(Json(json!({ "message": "Trip permanently deleted" })))
}

/// POST /api/trash/bookings/{id}/restore (also /api/bookings/{id}/restore)
pub(crate) async fn restore_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Value>, AppError> {
    state.bookings.restore_booking(id).await?;
    Ok(Json(json!({ "message": "Booking restored successfully" })))
}

/// DELETE /api/trash/bookings/{id}/permanent (also /api/bookings/{id}/permanent)
///
/// Also deletes the stored passport document, if any.
pub(crate) async fn purge_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Value>, AppError> {
    if let Some(document) = state.bookings.purge_booking(id).await? {
        state.documents.remove(&document).await;
    }
    Ok(Json(json!({ "message": "Booking permanently deleted" })))
}
