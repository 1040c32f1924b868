use axum::{extract::State, routing::get, Json, Router};
use safar_core::{BookingFilter, BookingStats};
use safar_ledger::StatsAggregator;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(get_stats))
}

/// GET /api/stats
async fn get_stats(State(state): State<AppState>) -> Result<Json<BookingStats>, AppError> {
    let total_trips = state.trips.count_trips().await?;
    let bookings = state.bookings.list_bookings(&BookingFilter::default()).await?;
    let stats = StatsAggregator::collect(total_trips, bookings.iter().map(|listing| &listing.booking));
    Ok(Json(stats))
}
