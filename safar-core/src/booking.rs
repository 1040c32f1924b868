use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use safar_shared::Masked;
use crate::trip::RoomTier;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";

/// A customer reservation against one room tier of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i32,
    /// `None` once the owning trip has been purged.
    pub trip_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub birth_place: String,
    pub passport_number: Masked<String>,
    pub passport_issue_date: String,
    pub passport_expiry_date: String,
    pub marital_status: String,
    pub family_members: String,
    pub occupation: String,
    pub umrah_type: String,
    pub room_type: RoomTier,
    pub notes: Option<String>,
    pub passport_file: Option<String>,
    pub status: String,
    pub branch: String,
    pub booking_date: DateTime<Utc>,
}

/// A validated booking ready to be stored; status and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub trip_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub birth_place: String,
    pub passport_number: Masked<String>,
    pub passport_issue_date: String,
    pub passport_expiry_date: String,
    pub marital_status: String,
    pub family_members: String,
    pub occupation: String,
    pub umrah_type: String,
    pub room_type: RoomTier,
    pub notes: Option<String>,
    pub passport_file: Option<String>,
    pub branch: String,
}

impl NewBooking {
    pub fn into_booking(self, id: i32, booking_date: DateTime<Utc>) -> Booking {
        Booking {
            id,
            trip_id: Some(self.trip_id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            birth_date: self.birth_date,
            birth_place: self.birth_place,
            passport_number: self.passport_number,
            passport_issue_date: self.passport_issue_date,
            passport_expiry_date: self.passport_expiry_date,
            marital_status: self.marital_status,
            family_members: self.family_members,
            occupation: self.occupation,
            umrah_type: self.umrah_type,
            room_type: self.room_type,
            notes: self.notes,
            passport_file: self.passport_file,
            status: STATUS_PENDING.to_string(),
            branch: self.branch,
            booking_date,
        }
    }
}

/// Trip fields shown next to a booking in the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSnapshot {
    pub date: Option<String>,
    pub airline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingListing {
    #[serde(flatten)]
    pub booking: Booking,
    pub trip: TripSnapshot,
}
