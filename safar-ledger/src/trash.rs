use chrono::{DateTime, Utc};
use safar_core::{CoreError, CoreResult, TrashedBooking, TrashedTrip};
use tracing::warn;

/// Where the trip a booking points at currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripPresence {
    Active,
    Trashed,
    /// Purged, or the booking's reference was nullified.
    Missing,
}

/// Rules of the soft-delete lifecycle shared by every repository implementation.
///
/// Trips with active bookings can be neither trashed nor purged, and a booking
/// can only come back while its trip is active. Together these keep every
/// active booking pointing at an active trip.
pub struct TrashPolicy;

impl TrashPolicy {
    pub fn ensure_trip_deletable(trip_id: i32, active_bookings: u64) -> CoreResult<()> {
        if active_bookings > 0 {
            warn!("Refusing to delete trip {} with {} active bookings", trip_id, active_bookings);
            return Err(CoreError::Conflict(
                "Cannot delete trip with existing bookings".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ensure_booking_restorable(booking_id: i32, trip: TripPresence) -> CoreResult<()> {
        match trip {
            TripPresence::Active => Ok(()),
            TripPresence::Trashed => {
                warn!("Booking {} cannot be restored while its trip is in the trash", booking_id);
                Err(CoreError::Conflict(
                    "Cannot restore booking: its trip is in the trash, restore the trip first".to_string(),
                ))
            }
            TripPresence::Missing => Err(CoreError::Conflict(
                "Cannot restore booking: its trip no longer exists".to_string(),
            )),
        }
    }

    /// Most recent shadow copy: latest deletion time, ties broken by the higher shadow id.
    pub fn latest_shadow<'a, T: Shadow + 'a>(
        entries: impl IntoIterator<Item = &'a T>,
        original_id: i32,
    ) -> Option<&'a T> {
        entries
            .into_iter()
            .filter(|e| e.original_id() == original_id)
            .max_by_key(|e| (e.deleted_at(), e.shadow_id()))
    }
}

/// Common view over trash-table entries.
pub trait Shadow {
    fn shadow_id(&self) -> i32;
    fn original_id(&self) -> i32;
    fn deleted_at(&self) -> DateTime<Utc>;
}

impl Shadow for TrashedTrip {
    fn shadow_id(&self) -> i32 { self.id }
    fn original_id(&self) -> i32 { self.original_id }
    fn deleted_at(&self) -> DateTime<Utc> { self.deleted_at }
}

impl Shadow for TrashedBooking {
    fn shadow_id(&self) -> i32 { self.id }
    fn original_id(&self) -> i32 { self.original_id }
    fn deleted_at(&self) -> DateTime<Utc> { self.deleted_at }
}
