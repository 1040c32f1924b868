use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use safar_catalog::RoomGate;
use safar_core::repository::BookingRepository;
use safar_core::{
    Booking, BookingFilter, BookingListing, CoreError, CoreResult, NewBooking, RoomTier, Trip,
    TripSnapshot, TrashedBookingSummary,
};
use safar_ledger::{TrashPolicy, TripPresence};
use safar_shared::Masked;
use crate::database::storage_err;
use crate::trip_repo::{TripRow, TRIP_COLUMNS};

const BOOKING_FIELDS: &str = "trip_id, first_name, last_name, email, phone, birth_date, birth_place, \
    passport_number, passport_issue_date, passport_expiry_date, marital_status, family_members, \
    occupation, umrah_type, room_type, notes, passport_file, status, branch, booking_date";

const LISTING_SELECT: &str = r#"
    SELECT b.id, b.trip_id, b.first_name, b.last_name, b.email, b.phone, b.birth_date, b.birth_place,
        b.passport_number, b.passport_issue_date, b.passport_expiry_date, b.marital_status,
        b.family_members, b.occupation, b.umrah_type, b.room_type, b.notes, b.passport_file,
        b.status, b.branch, b.booking_date,
        t.date AS trip_date, t.airline AS trip_airline
    FROM bookings b
    LEFT JOIN trips t ON t.id = b.trip_id
"#;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i32,
    trip_id: Option<i32>,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    birth_date: String,
    birth_place: String,
    passport_number: String,
    passport_issue_date: String,
    passport_expiry_date: String,
    marital_status: String,
    family_members: String,
    occupation: String,
    umrah_type: String,
    room_type: String,
    notes: Option<String>,
    passport_file: Option<String>,
    status: String,
    branch: String,
    booking_date: DateTime<Utc>,
    trip_date: Option<String>,
    trip_airline: Option<String>,
}

impl TryFrom<BookingRow> for BookingListing {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> CoreResult<Self> {
        let room_type: RoomTier = row.room_type.parse().map_err(CoreError::Storage)?;
        Ok(BookingListing {
            booking: Booking {
                id: row.id,
                trip_id: row.trip_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                phone: row.phone,
                birth_date: row.birth_date,
                birth_place: row.birth_place,
                passport_number: Masked(row.passport_number),
                passport_issue_date: row.passport_issue_date,
                passport_expiry_date: row.passport_expiry_date,
                marital_status: row.marital_status,
                family_members: row.family_members,
                occupation: row.occupation,
                umrah_type: row.umrah_type,
                room_type,
                notes: row.notes,
                passport_file: row.passport_file,
                status: row.status,
                branch: row.branch,
                booking_date: row.booking_date,
            },
            trip: TripSnapshot {
                date: row.trip_date,
                airline: row.trip_airline,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct TrashedBookingRow {
    id: i32,
    original_id: i32,
    trip_id: Option<i32>,
    first_name: String,
    last_name: String,
    phone: String,
    status: String,
    deleted_at: DateTime<Utc>,
}

impl From<TrashedBookingRow> for TrashedBookingSummary {
    fn from(row: TrashedBookingRow) -> Self {
        TrashedBookingSummary {
            id: row.id,
            original_id: row.original_id,
            trip_id: row.trip_id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            status: row.status,
            deleted_at: row.deleted_at,
        }
    }
}

async fn trip_presence(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Option<i32>,
) -> CoreResult<TripPresence> {
    let Some(trip_id) = trip_id else {
        return Ok(TripPresence::Missing);
    };

    let deleted: Option<bool> = sqlx::query_scalar("SELECT is_deleted FROM trips WHERE id = $1 FOR SHARE")
        .bind(trip_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage_err)?;

    Ok(match deleted {
        None => TripPresence::Missing,
        Some(true) => TripPresence::Trashed,
        Some(false) => TripPresence::Active,
    })
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<i32> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        // Shared lock: concurrent admissions proceed, a concurrent trip delete waits.
        let sql = format!("SELECT {} FROM trips WHERE id = $1 AND NOT is_deleted FOR SHARE", TRIP_COLUMNS);
        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(booking.trip_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?
            .ok_or_else(CoreError::trip_not_found)?;
        let trip = Trip::try_from(row)?;

        RoomGate::admit(&trip, booking.room_type)?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (trip_id, first_name, last_name, email, phone, birth_date, birth_place,
                passport_number, passport_issue_date, passport_expiry_date, marital_status, family_members,
                occupation, umrah_type, room_type, notes, passport_file, status, branch)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, 'pending', $18)
            RETURNING id
            "#,
        )
        .bind(booking.trip_id)
        .bind(&booking.first_name)
        .bind(&booking.last_name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(&booking.birth_date)
        .bind(&booking.birth_place)
        .bind(booking.passport_number.expose())
        .bind(&booking.passport_issue_date)
        .bind(&booking.passport_expiry_date)
        .bind(&booking.marital_status)
        .bind(&booking.family_members)
        .bind(&booking.occupation)
        .bind(&booking.umrah_type)
        .bind(booking.room_type.as_str())
        .bind(&booking.notes)
        .bind(&booking.passport_file)
        .bind(&booking.branch)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        info!("Booking {} created for trip {} (room {})", id, booking.trip_id, booking.room_type);
        Ok(id)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> CoreResult<Vec<BookingListing>> {
        let sql = format!(
            "{} WHERE NOT b.is_deleted AND ($1::TEXT IS NULL OR b.branch = $1) ORDER BY b.booking_date DESC, b.id DESC",
            LISTING_SELECT
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(&filter.branch)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.into_iter().map(BookingListing::try_from).collect()
    }

    async fn get_booking(&self, id: i32) -> CoreResult<Option<BookingListing>> {
        let sql = format!("{} WHERE b.id = $1 AND NOT b.is_deleted", LISTING_SELECT);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(BookingListing::try_from).transpose()
    }

    async fn update_booking_status(&self, id: i32, status: &str) -> CoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2 AND NOT is_deleted")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::booking_not_found());
        }
        info!("Booking {} status set to {}", id, status);
        Ok(())
    }

    async fn delete_booking(&self, id: i32) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM bookings WHERE id = $1 AND NOT is_deleted FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?
            .ok_or_else(CoreError::booking_not_found)?;

        let now = Utc::now();
        let copy = format!(
            "INSERT INTO trashed_bookings (original_id, {fields}, deleted_at) SELECT id, {fields}, $2 FROM bookings WHERE id = $1",
            fields = BOOKING_FIELDS
        );
        sqlx::query(&copy)
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        sqlx::query("UPDATE bookings SET is_deleted = TRUE, deleted_at = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        info!("Booking {} moved to trash", id);
        Ok(())
    }

    async fn restore_booking(&self, original_id: i32) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let shadow_id: i32 = sqlx::query_scalar(
            "SELECT id FROM trashed_bookings WHERE original_id = $1 ORDER BY deleted_at DESC, id DESC LIMIT 1 FOR UPDATE",
        )
        .bind(original_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_err)?
        .ok_or_else(|| CoreError::NotFound("Booking not found in trash".to_string()))?;

        // The live row holds the current reference; a purged trip has nulled it.
        let trip_id: Option<i32> = sqlx::query_scalar("SELECT trip_id FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(original_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?
            .ok_or_else(CoreError::booking_not_found)?;

        let presence = trip_presence(&mut tx, trip_id).await?;
        TrashPolicy::ensure_booking_restorable(original_id, presence)?;

        sqlx::query("UPDATE bookings SET is_deleted = FALSE, deleted_at = NULL WHERE id = $1")
            .bind(original_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        sqlx::query("DELETE FROM trashed_bookings WHERE id = $1")
            .bind(shadow_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        info!("Booking {} restored from trash", original_id);
        Ok(())
    }

    async fn purge_booking(&self, id: i32) -> CoreResult<Option<String>> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let shadows = sqlx::query("DELETE FROM trashed_bookings WHERE original_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();

        let removed: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM bookings WHERE id = $1 RETURNING passport_file")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage_err)?;

        if shadows == 0 && removed.is_none() {
            return Err(CoreError::booking_not_found());
        }

        tx.commit().await.map_err(storage_err)?;
        info!("Booking {} permanently deleted", id);
        Ok(removed.flatten())
    }

    async fn list_trashed_bookings(&self) -> CoreResult<Vec<TrashedBookingSummary>> {
        let rows = sqlx::query_as::<_, TrashedBookingRow>(
            r#"
            SELECT id, original_id, trip_id, first_name, last_name, phone, status, deleted_at
            FROM trashed_bookings
            ORDER BY deleted_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(TrashedBookingSummary::from).collect())
    }
}
