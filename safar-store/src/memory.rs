use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;
use safar_catalog::RoomGate;
use safar_core::repository::{BookingRepository, TripRepository};
use safar_core::{
    Booking, BookingFilter, BookingListing, CoreError, CoreResult, NewBooking, NewTrip,
    RoomStatuses, TrashedBooking, TrashedBookingSummary, TrashedTrip, TrashedTripSummary, Trip,
    TripFilter, TripPatch, TripSnapshot,
};
use safar_ledger::{TrashPolicy, TripPresence};

struct Row<T> {
    value: T,
    deleted_at: Option<DateTime<Utc>>,
}

impl<T> Row<T> {
    fn active(value: T) -> Self {
        Self { value, deleted_at: None }
    }

    fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Default)]
struct State {
    trips: BTreeMap<i32, Row<Trip>>,
    bookings: BTreeMap<i32, Row<Booking>>,
    trashed_trips: Vec<TrashedTrip>,
    trashed_bookings: Vec<TrashedBooking>,
    trip_seq: i32,
    booking_seq: i32,
    trashed_trip_seq: i32,
    trashed_booking_seq: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

impl State {
    fn active_bookings_for(&self, trip_id: i32) -> u64 {
        self.bookings
            .values()
            .filter(|b| b.is_active() && b.value.trip_id == Some(trip_id))
            .count() as u64
    }

    fn listing(&self, booking: &Booking) -> BookingListing {
        let trip = booking
            .trip_id
            .and_then(|id| self.trips.get(&id))
            .map(|row| TripSnapshot {
                date: Some(row.value.date.clone()),
                airline: Some(row.value.airline.clone()),
            })
            .unwrap_or_default();
        BookingListing { booking: booking.clone(), trip }
    }

    fn trip_presence(&self, trip_id: Option<i32>) -> TripPresence {
        match trip_id.and_then(|id| self.trips.get(&id)) {
            None => TripPresence::Missing,
            Some(row) if row.is_active() => TripPresence::Active,
            Some(_) => TripPresence::Trashed,
        }
    }
}

/// Process-local store with the same lifecycle rules as the Postgres
/// repositories. Each operation holds the write lock for its whole sequence,
/// which gives it the atomicity a transaction gives the database.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn create_trip(&self, trip: NewTrip) -> CoreResult<Trip> {
        let mut state = self.state.write().await;
        let id = next(&mut state.trip_seq);
        let trip = trip.into_trip(id, Utc::now());
        state.trips.insert(id, Row::active(trip.clone()));
        info!("Trip {} created", id);
        Ok(trip)
    }

    async fn list_trips(&self, filter: &TripFilter) -> CoreResult<Vec<Trip>> {
        let state = self.state.read().await;
        Ok(state
            .trips
            .values()
            .filter(|row| row.is_active() && filter.matches(&row.value))
            .map(|row| row.value.clone())
            .collect())
    }

    async fn get_trip(&self, id: i32) -> CoreResult<Option<Trip>> {
        let state = self.state.read().await;
        Ok(state
            .trips
            .get(&id)
            .filter(|row| row.is_active())
            .map(|row| row.value.clone()))
    }

    async fn count_trips(&self) -> CoreResult<u64> {
        let state = self.state.read().await;
        Ok(state.trips.values().filter(|row| row.is_active()).count() as u64)
    }

    async fn update_trip(&self, id: i32, patch: TripPatch) -> CoreResult<Trip> {
        let mut state = self.state.write().await;
        let row = state
            .trips
            .get_mut(&id)
            .filter(|row| row.is_active())
            .ok_or_else(CoreError::trip_not_found)?;
        row.value.apply(patch);
        info!("Trip {} updated", id);
        Ok(row.value.clone())
    }

    async fn update_room_statuses(&self, id: i32, statuses: RoomStatuses) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let row = state
            .trips
            .get_mut(&id)
            .filter(|row| row.is_active())
            .ok_or_else(CoreError::trip_not_found)?;
        row.value.rooms.set_statuses(&statuses);
        info!("Trip {} room statuses updated", id);
        Ok(())
    }

    async fn delete_trip(&self, id: i32) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let trip = match state.trips.get(&id) {
            Some(row) if row.is_active() => row.value.clone(),
            _ => return Err(CoreError::trip_not_found()),
        };
        TrashPolicy::ensure_trip_deletable(id, state.active_bookings_for(id))?;

        let now = Utc::now();
        let shadow_id = next(&mut state.trashed_trip_seq);
        state.trashed_trips.push(TrashedTrip {
            id: shadow_id,
            original_id: id,
            trip,
            deleted_at: now,
        });
        if let Some(row) = state.trips.get_mut(&id) {
            row.deleted_at = Some(now);
        }
        info!("Trip {} moved to trash", id);
        Ok(())
    }

    async fn restore_trip(&self, original_id: i32) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let shadow_id = TrashPolicy::latest_shadow(&state.trashed_trips, original_id)
            .map(|s| s.id)
            .ok_or_else(|| CoreError::NotFound("Trip not found in trash".to_string()))?;

        let row = state
            .trips
            .get_mut(&original_id)
            .ok_or_else(CoreError::trip_not_found)?;
        row.deleted_at = None;
        state.trashed_trips.retain(|s| s.id != shadow_id);
        info!("Trip {} restored from trash", original_id);
        Ok(())
    }

    async fn purge_trip(&self, id: i32) -> CoreResult<()> {
        let mut state = self.state.write().await;
        TrashPolicy::ensure_trip_deletable(id, state.active_bookings_for(id))?;

        let before = state.trashed_trips.len();
        state.trashed_trips.retain(|s| s.original_id != id);
        let shadows = before - state.trashed_trips.len();
        let removed = state.trips.remove(&id).is_some();

        if shadows == 0 && !removed {
            return Err(CoreError::trip_not_found());
        }

        // Mirrors ON DELETE SET NULL on the booking foreign key.
        for row in state.bookings.values_mut() {
            if row.value.trip_id == Some(id) {
                row.value.trip_id = None;
            }
        }
        for shadow in state.trashed_bookings.iter_mut() {
            if shadow.booking.trip_id == Some(id) {
                shadow.booking.trip_id = None;
            }
        }
        info!("Trip {} permanently deleted", id);
        Ok(())
    }

    async fn list_trashed_trips(&self) -> CoreResult<Vec<TrashedTripSummary>> {
        let state = self.state.read().await;
        let mut entries: Vec<&TrashedTrip> = state.trashed_trips.iter().collect();
        entries.sort_by(|a, b| (b.deleted_at, b.id).cmp(&(a.deleted_at, a.id)));
        Ok(entries.into_iter().map(TrashedTrip::summary).collect())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<i32> {
        let mut state = self.state.write().await;
        let trip = state
            .trips
            .get(&booking.trip_id)
            .filter(|row| row.is_active())
            .ok_or_else(CoreError::trip_not_found)?;
        RoomGate::admit(&trip.value, booking.room_type)?;

        let id = next(&mut state.booking_seq);
        let trip_id = booking.trip_id;
        state.bookings.insert(id, Row::active(booking.into_booking(id, Utc::now())));
        info!("Booking {} created for trip {}", id, trip_id);
        Ok(id)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> CoreResult<Vec<BookingListing>> {
        let state = self.state.read().await;
        let mut bookings: Vec<&Booking> = state
            .bookings
            .values()
            .filter(|row| row.is_active() && filter.matches(&row.value))
            .map(|row| &row.value)
            .collect();
        bookings.sort_by(|a, b| (b.booking_date, b.id).cmp(&(a.booking_date, a.id)));
        Ok(bookings.into_iter().map(|b| state.listing(b)).collect())
    }

    async fn get_booking(&self, id: i32) -> CoreResult<Option<BookingListing>> {
        let state = self.state.read().await;
        Ok(state
            .bookings
            .get(&id)
            .filter(|row| row.is_active())
            .map(|row| state.listing(&row.value)))
    }

    async fn update_booking_status(&self, id: i32, status: &str) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let row = state
            .bookings
            .get_mut(&id)
            .filter(|row| row.is_active())
            .ok_or_else(CoreError::booking_not_found)?;
        row.value.status = status.to_string();
        info!("Booking {} status set to {}", id, status);
        Ok(())
    }

    async fn delete_booking(&self, id: i32) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let booking = match state.bookings.get(&id) {
            Some(row) if row.is_active() => row.value.clone(),
            _ => return Err(CoreError::booking_not_found()),
        };

        let now = Utc::now();
        let shadow_id = next(&mut state.trashed_booking_seq);
        state.trashed_bookings.push(TrashedBooking {
            id: shadow_id,
            original_id: id,
            booking,
            deleted_at: now,
        });
        if let Some(row) = state.bookings.get_mut(&id) {
            row.deleted_at = Some(now);
        }
        info!("Booking {} moved to trash", id);
        Ok(())
    }

    async fn restore_booking(&self, original_id: i32) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let shadow_id = TrashPolicy::latest_shadow(&state.trashed_bookings, original_id)
            .map(|s| s.id)
            .ok_or_else(|| CoreError::NotFound("Booking not found in trash".to_string()))?;

        let trip_id = state
            .bookings
            .get(&original_id)
            .map(|row| row.value.trip_id)
            .ok_or_else(CoreError::booking_not_found)?;
        TrashPolicy::ensure_booking_restorable(original_id, state.trip_presence(trip_id))?;

        if let Some(row) = state.bookings.get_mut(&original_id) {
            row.deleted_at = None;
        }
        state.trashed_bookings.retain(|s| s.id != shadow_id);
        info!("Booking {} restored from trash", original_id);
        Ok(())
    }

    async fn purge_booking(&self, id: i32) -> CoreResult<Option<String>> {
        let mut state = self.state.write().await;
        let before = state.trashed_bookings.len();
        state.trashed_bookings.retain(|s| s.original_id != id);
        let shadows = before - state.trashed_bookings.len();

        match state.bookings.remove(&id) {
            Some(row) => {
                info!("Booking {} permanently deleted", id);
                Ok(row.value.passport_file)
            }
            None if shadows > 0 => Ok(None),
            None => Err(CoreError::booking_not_found()),
        }
    }

    async fn list_trashed_bookings(&self) -> CoreResult<Vec<TrashedBookingSummary>> {
        let state = self.state.read().await;
        let mut entries: Vec<&TrashedBooking> = state.trashed_bookings.iter().collect();
        entries.sort_by(|a, b| (b.deleted_at, b.id).cmp(&(a.deleted_at, a.id)));
        Ok(entries.into_iter().map(TrashedBooking::summary).collect())
    }
}
