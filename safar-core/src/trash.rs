use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::booking::Booking;
use crate::trip::Trip;

/// Shadow copy of a trip taken when it was soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashedTrip {
    pub id: i32,
    pub original_id: i32,
    pub trip: Trip,
    pub deleted_at: DateTime<Utc>,
}

impl TrashedTrip {
    pub fn summary(&self) -> TrashedTripSummary {
        TrashedTripSummary {
            id: self.id,
            original_id: self.original_id,
            date: self.trip.date.clone(),
            airline: self.trip.airline.clone(),
            hotel: self.trip.hotel.clone(),
            trip_type: self.trip.trip_type.clone(),
            state: self.trip.state.clone(),
            deleted_at: self.deleted_at,
        }
    }
}

/// Shadow copy of a booking taken when it was soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashedBooking {
    pub id: i32,
    pub original_id: i32,
    pub booking: Booking,
    pub deleted_at: DateTime<Utc>,
}

impl TrashedBooking {
    pub fn summary(&self) -> TrashedBookingSummary {
        TrashedBookingSummary {
            id: self.id,
            original_id: self.original_id,
            trip_id: self.booking.trip_id,
            first_name: self.booking.first_name.clone(),
            last_name: self.booking.last_name.clone(),
            phone: self.booking.phone.clone(),
            status: self.booking.status.clone(),
            deleted_at: self.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashedTripSummary {
    pub id: i32,
    pub original_id: i32,
    pub date: String,
    pub airline: String,
    pub hotel: String,
    #[serde(rename = "type")]
    pub trip_type: String,
    pub state: String,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashedBookingSummary {
    pub id: i32,
    pub original_id: i32,
    pub trip_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub status: String,
    pub deleted_at: DateTime<Utc>,
}
