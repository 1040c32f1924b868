use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use safar_catalog::RoomGate;
use safar_core::{BookingFilter, BookingListing, CoreError, NewBooking};
use safar_ledger::BookingForm;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;
use crate::trash;

/// Multipart field carrying the passport scan.
const FILE_FIELD: &str = "passportFile";

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route(
            "/api/bookings/{id}",
            get(get_booking).put(update_booking_status).delete(delete_booking),
        )
        .route("/api/bookings/{id}/restore", post(trash::restore_booking))
        .route("/api/bookings/{id}/permanent", delete(trash::purge_booking))
}

// ============================================================================
// Intake
// ============================================================================

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// POST /api/bookings (JSON or multipart/form-data)
async fn create_booking(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let id = if is_multipart {
        let multipart = Multipart::from_request(request, &state).await?;
        let (form, upload) = read_multipart(multipart).await?;
        admit_with_upload(&state, form, upload).await?
    } else {
        let AppJson(form) = AppJson::<BookingForm>::from_request(request, &state).await?;
        let booking = form.into_new_booking(None)?;
        state.bookings.create_booking(booking).await?
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking created successfully",
            "id": id,
        })),
    ))
}

async fn read_multipart(mut multipart: Multipart) -> Result<(BookingForm, Option<Upload>), AppError> {
    let mut form = BookingForm::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file was chosen.
            if !file_name.is_empty() && !bytes.is_empty() {
                upload = Some(Upload { file_name, bytes: bytes.to_vec() });
            }
            continue;
        }

        let value = field.text().await?;
        if !form.set_field(&name, value)? {
            debug!("Ignoring unknown booking field {}", name);
        }
    }

    Ok((form, upload))
}

/// Stores the upload only once the booking looks admissible. The file stays
/// guarded until the insert commits, so a failed or abandoned commit removes it.
async fn admit_with_upload(
    state: &AppState,
    form: BookingForm,
    upload: Option<Upload>,
) -> Result<i32, AppError> {
    let Some(upload) = upload else {
        let booking = form.into_new_booking(None)?;
        return Ok(state.bookings.create_booking(booking).await?);
    };

    safar_store::DocumentStore::accepted_extension(&upload.file_name)?;
    let mut booking = form.into_new_booking(None)?;
    precheck(state, &booking).await?;

    let document = state
        .documents
        .save(&upload.file_name, &upload.bytes)
        .await?
        .pending();
    booking.passport_file = Some(document.reference().to_string());

    let id = state.bookings.create_booking(booking).await.map_err(|err| {
        warn!("Booking rejected after upload, discarding {}", document.reference());
        err
    })?;
    document.keep();
    Ok(id)
}

async fn precheck(state: &AppState, booking: &NewBooking) -> Result<(), AppError> {
    let trip = state
        .trips
        .get_trip(booking.trip_id)
        .await?
        .ok_or_else(CoreError::trip_not_found)?;
    RoomGate::admit(&trip, booking.room_type)?;
    Ok(())
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /api/bookings?branch=
async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = BookingFilter::new(query.branch);
    let bookings = state.bookings.list_bookings(&filter).await?;
    Ok(Json(json!({ "bookings": bookings })))
}

/// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<BookingListing>, AppError> {
    let booking = state
        .bookings
        .get_booking(id)
        .await?
        .ok_or_else(CoreError::booking_not_found)?;
    Ok(Json(booking))
}

/// PUT /api/bookings/{id}
async fn update_booking_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<StatusUpdate>,
) -> Result<Json<Value>, AppError> {
    let status = req
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::missing_field("status"))?;

    state.bookings.update_booking_status(id, &status).await?;
    Ok(Json(json!({ "message": "Booking status updated successfully" })))
}

/// DELETE /api/bookings/{id}
async fn delete_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Value>, AppError> {
    state.bookings.delete_booking(id).await?;
    Ok(Json(json!({ "message": "Booking moved to trash" })))
}
