use async_trait::async_trait;
use crate::booking::{BookingListing, NewBooking};
use crate::filter::{BookingFilter, TripFilter};
use crate::trash::{TrashedBookingSummary, TrashedTripSummary};
use crate::trip::{NewTrip, RoomStatuses, Trip, TripPatch};
use crate::CoreResult;

/// Repository trait for the trip catalog and its trash table.
///
/// Every method is one atomic unit: implementations wrap multi-statement
/// sequences in a single transaction.
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create_trip(&self, trip: NewTrip) -> CoreResult<Trip>;

    /// Active trips only, ordered by id.
    async fn list_trips(&self, filter: &TripFilter) -> CoreResult<Vec<Trip>>;

    /// `None` when the trip is absent or soft-deleted.
    async fn get_trip(&self, id: i32) -> CoreResult<Option<Trip>>;

    async fn count_trips(&self) -> CoreResult<u64>;

    async fn update_trip(&self, id: i32, patch: TripPatch) -> CoreResult<Trip>;

    async fn update_room_statuses(&self, id: i32, statuses: RoomStatuses) -> CoreResult<()>;

    /// Copies the trip into the trash table and flags it deleted.
    async fn delete_trip(&self, id: i32) -> CoreResult<()>;

    /// Unflags the trip and drops its most recent shadow copy.
    async fn restore_trip(&self, original_id: i32) -> CoreResult<()>;

    /// Physically removes the trip and all of its shadow copies.
    async fn purge_trip(&self, id: i32) -> CoreResult<()>;

    /// Newest deletion first.
    async fn list_trashed_trips(&self) -> CoreResult<Vec<TrashedTripSummary>>;
}

/// Repository trait for the booking ledger and its trash table.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Admits the booking through the room inventory gate and stores it.
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<i32>;

    /// Active bookings joined with their trip, newest first.
    async fn list_bookings(&self, filter: &BookingFilter) -> CoreResult<Vec<BookingListing>>;

    async fn get_booking(&self, id: i32) -> CoreResult<Option<BookingListing>>;

    async fn update_booking_status(&self, id: i32, status: &str) -> CoreResult<()>;

    async fn delete_booking(&self, id: i32) -> CoreResult<()>;

    async fn restore_booking(&self, original_id: i32) -> CoreResult<()>;

    /// Physically removes the booking and its shadow copies. Returns the stored
    /// passport document reference so the caller can delete the file.
    async fn purge_booking(&self, id: i32) -> CoreResult<Option<String>>;

    async fn list_trashed_bookings(&self) -> CoreResult<Vec<TrashedBookingSummary>>;
}
