//! Store trait consumed by the service layer
//!
//! The booking engine holds no in-process state; the tenant-scoped store is
//! the only shared mutable resource. This trait is the seam that lets tests
//! substitute an in-memory store for Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rezervo_core::models::{Booking, Guest, Room, Tenant};
use rezervo_core::{AppError, TenantScope};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{BookingRepository, GuestRepository, RoomRepository, TenantRepository};

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>, AppError>;

    async fn get_room(&self, scope: TenantScope, id: Uuid) -> Result<Option<Room>, AppError>;

    async fn get_guest(&self, scope: TenantScope, id: Uuid) -> Result<Option<Guest>, AppError>;

    async fn get_booking(&self, scope: TenantScope, id: Uuid)
        -> Result<Option<Booking>, AppError>;

    async fn list_bookings(
        &self,
        scope: TenantScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, AppError>;

    /// Half-open interval overlap against active bookings for the room.
    async fn has_conflict(
        &self,
        tenant_id: Uuid,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool, AppError>;

    /// Availability check and insert as one atomic unit. Implementations must
    /// guarantee that of N concurrent calls for the same room and overlapping
    /// dates exactly one succeeds; the rest fail with `Conflict`.
    async fn create_booking_if_available(&self, booking: Booking) -> Result<Booking, AppError>;

    /// Conditional write keyed on the booking's last-known version; `None`
    /// signals a version mismatch the caller may retry.
    async fn update_booking_versioned(
        &self,
        expected_version: i64,
        booking: &Booking,
    ) -> Result<Option<Booking>, AppError>;
}

/// Postgres-backed store wiring the per-entity repositories together.
#[derive(Clone)]
pub struct PgBookingStore {
    tenants: TenantRepository,
    rooms: RoomRepository,
    guests: GuestRepository,
    bookings: BookingRepository,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tenants: TenantRepository::new(pool.clone()),
            rooms: RoomRepository::new(pool.clone()),
            guests: GuestRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool),
        }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        self.tenants.get(id).await
    }

    async fn get_room(&self, scope: TenantScope, id: Uuid) -> Result<Option<Room>, AppError> {
        self.rooms.get(scope, id).await
    }

    async fn get_guest(&self, scope: TenantScope, id: Uuid) -> Result<Option<Guest>, AppError> {
        self.guests.get(scope, id).await
    }

    async fn get_booking(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError> {
        self.bookings.get(scope, id).await
    }

    async fn list_bookings(
        &self,
        scope: TenantScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, AppError> {
        self.bookings.list(scope, limit, offset).await
    }

    async fn has_conflict(
        &self,
        tenant_id: Uuid,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        self.bookings
            .has_conflict(tenant_id, room_id, check_in, check_out, exclude_booking_id)
            .await
    }

    async fn create_booking_if_available(&self, booking: Booking) -> Result<Booking, AppError> {
        self.bookings.create_if_available(booking).await
    }

    async fn update_booking_versioned(
        &self,
        expected_version: i64,
        booking: &Booking,
    ) -> Result<Option<Booking>, AppError> {
        self.bookings.update_versioned(expected_version, booking).await
    }
}
