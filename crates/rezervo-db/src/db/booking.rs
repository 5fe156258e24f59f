use chrono::{DateTime, Utc};
use rezervo_core::models::{
    Booking, BookingSource, BookingStatus, PaymentRecord, Pricing,
};
use rezervo_core::{AppError, TenantScope};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Row shape for the bookings table. The pricing snapshot and the payment
/// ledger live in jsonb columns so the ledger append and the cached paid
/// amount always move in the same write.
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    tenant_id: Uuid,
    room_id: Uuid,
    guest_id: Uuid,
    check_in_date: DateTime<Utc>,
    check_out_date: DateTime<Utc>,
    number_of_guests: i32,
    status: BookingStatus,
    source: BookingSource,
    pricing: Json<Pricing>,
    payment: Json<PaymentRecord>,
    special_requests: Option<String>,
    notes: Option<String>,
    actual_check_in: Option<DateTime<Utc>>,
    actual_check_out: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Booking {
        Booking {
            id: self.id,
            tenant_id: self.tenant_id,
            room_id: self.room_id,
            guest_id: self.guest_id,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            number_of_guests: self.number_of_guests,
            status: self.status,
            source: self.source,
            pricing: self.pricing.0,
            payment: self.payment.0,
            special_requests: self.special_requests,
            notes: self.notes,
            actual_check_in: self.actual_check_in,
            actual_check_out: self.actual_check_out,
            cancelled_at: self.cancelled_at,
            cancellation_reason: self.cancellation_reason,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, scope: TenantScope, id: Uuid) -> Result<Option<Booking>, AppError> {
        let row: Option<BookingRow> = match scope.tenant_filter() {
            Some(tenant_id) => {
                sqlx::query_as::<Postgres, BookingRow>(
                    "SELECT * FROM bookings WHERE tenant_id = $1 AND id = $2",
                )
                .bind(tenant_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<Postgres, BookingRow>("SELECT * FROM bookings WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(row.map(BookingRow::into_booking))
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select"))]
    pub async fn list(
        &self,
        scope: TenantScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, AppError> {
        let rows: Vec<BookingRow> = match scope.tenant_filter() {
            Some(tenant_id) => {
                sqlx::query_as::<Postgres, BookingRow>(
                    "SELECT * FROM bookings WHERE tenant_id = $1 ORDER BY check_in_date DESC LIMIT $2 OFFSET $3",
                )
                .bind(tenant_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<Postgres, BookingRow>(
                    "SELECT * FROM bookings ORDER BY check_in_date DESC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(BookingRow::into_booking).collect())
    }

    /// Half-open overlap check against active bookings for the same room and
    /// tenant: two intervals overlap iff existing.check_in < check_out AND
    /// existing.check_out > check_in.
    #[tracing::instrument(skip(self), fields(db.table = "bookings", db.operation = "select", db.record_id = %room_id))]
    pub async fn has_conflict(
        &self,
        tenant_id: Uuid,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM bookings
            WHERE tenant_id = $1 AND room_id = $2
              AND status IN ('pending', 'confirmed', 'checked_in')
              AND check_in_date < $4 AND check_out_date > $3
              AND ($5::uuid IS NULL OR id <> $5)
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(room_id)
        .bind(check_in)
        .bind(check_out)
        .bind(exclude_booking_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exists.is_some())
    }

    /// Atomically check availability and insert the booking.
    ///
    /// The room row is locked for the duration of the transaction so two
    /// concurrent creations for the same room serialize: exactly one sees no
    /// conflict and commits, the other surfaces `Conflict`.
    #[tracing::instrument(skip(self, booking), fields(db.table = "bookings", db.operation = "insert", db.record_id = %booking.id))]
    pub async fn create_if_available(&self, booking: Booking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let room_lock: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM rooms WHERE tenant_id = $1 AND id = $2 FOR UPDATE")
                .bind(booking.tenant_id)
                .bind(booking.room_id)
                .fetch_optional(&mut *tx)
                .await?;
        if room_lock.is_none() {
            return Err(AppError::NotFound("Room not found".to_string()));
        }

        let conflict: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM bookings
            WHERE tenant_id = $1 AND room_id = $2
              AND status IN ('pending', 'confirmed', 'checked_in')
              AND check_in_date < $4 AND check_out_date > $3
            LIMIT 1
            "#,
        )
        .bind(booking.tenant_id)
        .bind(booking.room_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .fetch_optional(&mut *tx)
        .await?;
        if conflict.is_some() {
            return Err(AppError::Conflict(
                "Room is not available for the requested dates".to_string(),
            ));
        }

        let row: BookingRow = sqlx::query_as::<Postgres, BookingRow>(
            r#"
            INSERT INTO bookings (
                id, tenant_id, room_id, guest_id,
                check_in_date, check_out_date, number_of_guests,
                status, source, pricing, payment,
                special_requests, notes,
                actual_check_in, actual_check_out, cancelled_at, cancellation_reason,
                version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.tenant_id)
        .bind(booking.room_id)
        .bind(booking.guest_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.number_of_guests)
        .bind(booking.status)
        .bind(booking.source)
        .bind(Json(&booking.pricing))
        .bind(Json(&booking.payment))
        .bind(&booking.special_requests)
        .bind(&booking.notes)
        .bind(booking.actual_check_in)
        .bind(booking.actual_check_out)
        .bind(booking.cancelled_at)
        .bind(&booking.cancellation_reason)
        .bind(booking.version)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into_booking())
    }

    /// Conditional write keyed on the booking's last-known version. Returns
    /// `None` when the version no longer matches, in which case the caller
    /// reloads and retries within its bounded loop. Dates, room, guest, and
    /// the pricing snapshot are deliberately not writable here.
    #[tracing::instrument(skip(self, booking), fields(db.table = "bookings", db.operation = "update", db.record_id = %booking.id))]
    pub async fn update_versioned(
        &self,
        expected_version: i64,
        booking: &Booking,
    ) -> Result<Option<Booking>, AppError> {
        let row: Option<BookingRow> = sqlx::query_as::<Postgres, BookingRow>(
            r#"
            UPDATE bookings
            SET status = $4,
                payment = $5,
                special_requests = $6,
                notes = $7,
                actual_check_in = $8,
                actual_check_out = $9,
                cancelled_at = $10,
                cancellation_reason = $11,
                version = version + 1,
                updated_at = $12
            WHERE id = $1 AND tenant_id = $2 AND version = $3
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.tenant_id)
        .bind(expected_version)
        .bind(booking.status)
        .bind(Json(&booking.payment))
        .bind(&booking.special_requests)
        .bind(&booking.notes)
        .bind(booking.actual_check_in)
        .bind(booking.actual_check_out)
        .bind(booking.cancelled_at)
        .bind(&booking.cancellation_reason)
        .bind(booking.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(BookingRow::into_booking))
    }
}
