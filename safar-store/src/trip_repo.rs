use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use safar_core::repository::TripRepository;
use safar_core::{
    CoreError, CoreResult, NewTrip, Room, RoomStatus, RoomStatuses, Rooms, Trip, TripFilter,
    TripPatch, TrashedTripSummary,
};
use safar_ledger::TrashPolicy;
use crate::database::storage_err;

pub(crate) const TRIP_COLUMNS: &str = "id, date, airline, airline_logo, hotel, hotel_logo, hotel_distance, \
    route, duration, type, state, room5_price, room5_status, room4_price, room4_status, \
    room3_price, room3_status, room2_price, room2_status, created_at";

// Same field set without the id; used to copy a row into the trash table.
const TRIP_FIELDS: &str = "date, airline, airline_logo, hotel, hotel_logo, hotel_distance, \
    route, duration, type, state, room5_price, room5_status, room4_price, room4_status, \
    room3_price, room3_status, room2_price, room2_status, created_at";

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
pub(crate) struct TripRow {
    id: i32,
    date: String,
    airline: String,
    airline_logo: Option<String>,
    hotel: String,
    hotel_logo: Option<String>,
    hotel_distance: Option<String>,
    route: String,
    duration: i32,
    #[sqlx(rename = "type")]
    trip_type: String,
    state: String,
    room5_price: i32,
    room5_status: String,
    room4_price: i32,
    room4_status: String,
    room3_price: i32,
    room3_status: String,
    room2_price: i32,
    room2_status: String,
    created_at: DateTime<Utc>,
}

fn room(price: i32, status: &str) -> CoreResult<Room> {
    let status: RoomStatus = status.parse().map_err(CoreError::Storage)?;
    Ok(Room { price, status })
}

impl TryFrom<TripRow> for Trip {
    type Error = CoreError;

    fn try_from(row: TripRow) -> CoreResult<Self> {
        Ok(Trip {
            id: row.id,
            date: row.date,
            airline: row.airline,
            airline_logo: row.airline_logo,
            hotel: row.hotel,
            hotel_logo: row.hotel_logo,
            hotel_distance: row.hotel_distance,
            route: row.route,
            duration: row.duration,
            trip_type: row.trip_type,
            state: row.state,
            rooms: Rooms {
                room5: room(row.room5_price, &row.room5_status)?,
                room4: room(row.room4_price, &row.room4_status)?,
                room3: room(row.room3_price, &row.room3_status)?,
                room2: room(row.room2_price, &row.room2_status)?,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TrashedTripRow {
    id: i32,
    original_id: i32,
    date: String,
    airline: String,
    hotel: String,
    #[sqlx(rename = "type")]
    trip_type: String,
    state: String,
    deleted_at: DateTime<Utc>,
}

impl From<TrashedTripRow> for TrashedTripSummary {
    fn from(row: TrashedTripRow) -> Self {
        TrashedTripSummary {
            id: row.id,
            original_id: row.original_id,
            date: row.date,
            airline: row.airline,
            hotel: row.hotel,
            trip_type: row.trip_type,
            state: row.state,
            deleted_at: row.deleted_at,
        }
    }
}

async fn count_active_bookings(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    trip_id: i32,
) -> CoreResult<u64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE trip_id = $1 AND NOT is_deleted",
    )
    .bind(trip_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(storage_err)?;
    Ok(count as u64)
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create_trip(&self, trip: NewTrip) -> CoreResult<Trip> {
        let rooms = trip.initial_rooms();
        let sql = format!(
            r#"
            INSERT INTO trips (date, airline, airline_logo, hotel, hotel_logo, hotel_distance, route, duration, type, state,
                room5_price, room5_status, room4_price, room4_status, room3_price, room3_status, room2_price, room2_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {}
            "#,
            TRIP_COLUMNS
        );

        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(&trip.date)
            .bind(&trip.airline)
            .bind(&trip.airline_logo)
            .bind(&trip.hotel)
            .bind(&trip.hotel_logo)
            .bind(&trip.hotel_distance)
            .bind(&trip.route)
            .bind(trip.duration)
            .bind(&trip.trip_type)
            .bind(&trip.state)
            .bind(rooms.room5.price)
            .bind(rooms.room5.status.as_str())
            .bind(rooms.room4.price)
            .bind(rooms.room4.status.as_str())
            .bind(rooms.room3.price)
            .bind(rooms.room3.status.as_str())
            .bind(rooms.room2.price)
            .bind(rooms.room2.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;

        let trip = Trip::try_from(row)?;
        info!("Trip {} created", trip.id);
        Ok(trip)
    }

    async fn list_trips(&self, filter: &TripFilter) -> CoreResult<Vec<Trip>> {
        let sql = format!(
            r#"
            SELECT {} FROM trips
            WHERE NOT is_deleted
              AND ($1::TEXT IS NULL OR state = 'all' OR state = $1 OR strpos(state, $1) > 0)
              AND ($2::TEXT IS NULL OR type = $2)
            ORDER BY id
            "#,
            TRIP_COLUMNS
        );

        let rows = sqlx::query_as::<_, TripRow>(&sql)
            .bind(&filter.state)
            .bind(&filter.trip_type)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.into_iter().map(Trip::try_from).collect()
    }

    async fn get_trip(&self, id: i32) -> CoreResult<Option<Trip>> {
        let sql = format!("SELECT {} FROM trips WHERE id = $1 AND NOT is_deleted", TRIP_COLUMNS);
        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(Trip::try_from).transpose()
    }

    async fn count_trips(&self) -> CoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips WHERE NOT is_deleted")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(count as u64)
    }

    async fn update_trip(&self, id: i32, patch: TripPatch) -> CoreResult<Trip> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let sql = format!("SELECT {} FROM trips WHERE id = $1 AND NOT is_deleted FOR UPDATE", TRIP_COLUMNS);
        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?
            .ok_or_else(CoreError::trip_not_found)?;

        let mut trip = Trip::try_from(row)?;
        trip.apply(patch);

        sqlx::query(
            r#"
            UPDATE trips SET
                date = $1, airline = $2, airline_logo = $3, hotel = $4, hotel_logo = $5,
                hotel_distance = $6, route = $7, duration = $8, type = $9, state = $10,
                room5_price = $11, room4_price = $12, room3_price = $13, room2_price = $14
            WHERE id = $15
            "#,
        )
        .bind(&trip.date)
        .bind(&trip.airline)
        .bind(&trip.airline_logo)
        .bind(&trip.hotel)
        .bind(&trip.hotel_logo)
        .bind(&trip.hotel_distance)
        .bind(&trip.route)
        .bind(trip.duration)
        .bind(&trip.trip_type)
        .bind(&trip.state)
        .bind(trip.rooms.room5.price)
        .bind(trip.rooms.room4.price)
        .bind(trip.rooms.room3.price)
        .bind(trip.rooms.room2.price)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        info!("Trip {} updated", id);
        Ok(trip)
    }

    async fn update_room_statuses(&self, id: i32, statuses: RoomStatuses) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE trips SET
                room5_status = $1, room4_status = $2, room3_status = $3, room2_status = $4
            WHERE id = $5 AND NOT is_deleted
            "#,
        )
        .bind(statuses.room5.as_str())
        .bind(statuses.room4.as_str())
        .bind(statuses.room3.as_str())
        .bind(statuses.room2.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::trip_not_found());
        }
        info!("Trip {} room statuses updated", id);
        Ok(())
    }

    async fn delete_trip(&self, id: i32) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        // Conflicts with the shared lock taken while a booking is admitted.
        sqlx::query_scalar::<_, i32>("SELECT id FROM trips WHERE id = $1 AND NOT is_deleted FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?
            .ok_or_else(CoreError::trip_not_found)?;

        let active = count_active_bookings(&mut tx, id).await?;
        TrashPolicy::ensure_trip_deletable(id, active)?;

        let now = Utc::now();
        let copy = format!(
            "INSERT INTO trashed_trips (original_id, {fields}, deleted_at) SELECT id, {fields}, $2 FROM trips WHERE id = $1",
            fields = TRIP_FIELDS
        );
        sqlx::query(&copy)
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        sqlx::query("UPDATE trips SET is_deleted = TRUE, deleted_at = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        info!("Trip {} moved to trash", id);
        Ok(())
    }

    async fn restore_trip(&self, original_id: i32) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let shadow_id: i32 = sqlx::query_scalar(
            "SELECT id FROM trashed_trips WHERE original_id = $1 ORDER BY deleted_at DESC, id DESC LIMIT 1 FOR UPDATE",
        )
        .bind(original_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_err)?
        .ok_or_else(|| CoreError::NotFound("Trip not found in trash".to_string()))?;

        let restored = sqlx::query("UPDATE trips SET is_deleted = FALSE, deleted_at = NULL WHERE id = $1")
            .bind(original_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        if restored.rows_affected() == 0 {
            return Err(CoreError::trip_not_found());
        }

        sqlx::query("DELETE FROM trashed_trips WHERE id = $1")
            .bind(shadow_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        info!("Trip {} restored from trash", original_id);
        Ok(())
    }

    async fn purge_trip(&self, id: i32) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("SELECT id FROM trips WHERE id = $1 FOR UPDATE")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        let active = count_active_bookings(&mut tx, id).await?;
        TrashPolicy::ensure_trip_deletable(id, active)?;

        let shadows = sqlx::query("DELETE FROM trashed_trips WHERE original_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();

        // The foreign key nulls live booking rows; shadow copies carry no constraint.
        sqlx::query("UPDATE trashed_bookings SET trip_id = NULL WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        let rows = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();

        if shadows + rows == 0 {
            return Err(CoreError::trip_not_found());
        }

        tx.commit().await.map_err(storage_err)?;
        info!("Trip {} permanently deleted", id);
        Ok(())
    }

    async fn list_trashed_trips(&self) -> CoreResult<Vec<TrashedTripSummary>> {
        let rows = sqlx::query_as::<_, TrashedTripRow>(
            r#"
            SELECT id, original_id, date, airline, hotel, type, state, deleted_at
            FROM trashed_trips
            ORDER BY deleted_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(TrashedTripSummary::from).collect())
    }
}
