pub mod trip;
pub mod filter;
pub mod booking;
pub mod trash;
pub mod stats;
pub mod repository;

pub use trip::{Room, RoomStatus, RoomStatuses, RoomTier, Rooms, StateTags, NewTrip, Trip, TripPatch};
pub use booking::{Booking, BookingListing, NewBooking, TripSnapshot};
pub use filter::{BookingFilter, TripFilter};
pub use trash::{TrashedBooking, TrashedBookingSummary, TrashedTrip, TrashedTripSummary};
pub use stats::BookingStats;

/// Errors shared by every layer below the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    UploadRejected(String),
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn missing_field(field: &str) -> Self {
        CoreError::Validation(format!("Missing required field: {}", field))
    }

    pub fn trip_not_found() -> Self {
        CoreError::NotFound("Trip not found".to_string())
    }

    pub fn booking_not_found() -> Self {
        CoreError::NotFound("Booking not found".to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
