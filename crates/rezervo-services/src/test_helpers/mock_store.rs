//! In-memory store for testing the service layer without a database.
//!
//! A single mutex guards all tables so the availability check and the insert
//! happen under one critical section, matching the Postgres store's
//! row-lock-then-insert guarantee.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rezervo_core::models::{Booking, Guest, Room, Tenant};
use rezervo_core::{AppError, AuditEvent, AuditSink, TenantScope};
use rezervo_db::BookingStore;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    tenants: HashMap<Uuid, Tenant>,
    rooms: HashMap<Uuid, Room>,
    guests: HashMap<Uuid, Guest>,
    bookings: HashMap<Uuid, Booking>,
}

#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tenant(&self, tenant: Tenant) {
        self.tables.lock().unwrap().tenants.insert(tenant.id, tenant);
    }

    pub fn add_room(&self, room: Room) {
        self.tables.lock().unwrap().rooms.insert(room.id, room);
    }

    pub fn add_guest(&self, guest: Guest) {
        self.tables.lock().unwrap().guests.insert(guest.id, guest);
    }

    pub fn add_booking(&self, booking: Booking) {
        self.tables
            .lock()
            .unwrap()
            .bookings
            .insert(booking.id, booking);
    }

    pub fn booking_count(&self) -> usize {
        self.tables.lock().unwrap().bookings.len()
    }
}

fn overlaps(
    tables: &Tables,
    tenant_id: Uuid,
    room_id: Uuid,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> bool {
    tables.bookings.values().any(|b| {
        b.tenant_id == tenant_id
            && b.room_id == room_id
            && b.status.is_active()
            && exclude != Some(b.id)
            && b.check_in_date < check_out
            && b.check_out_date > check_in
    })
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        Ok(self.tables.lock().unwrap().tenants.get(&id).cloned())
    }

    async fn get_room(&self, scope: TenantScope, id: Uuid) -> Result<Option<Room>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .rooms
            .get(&id)
            .filter(|r| scope.permits(r.tenant_id))
            .cloned())
    }

    async fn get_guest(&self, scope: TenantScope, id: Uuid) -> Result<Option<Guest>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .guests
            .get(&id)
            .filter(|g| scope.permits(g.tenant_id))
            .cloned())
    }

    async fn get_booking(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .bookings
            .get(&id)
            .filter(|b| scope.permits(b.tenant_id))
            .cloned())
    }

    async fn list_bookings(
        &self,
        scope: TenantScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| scope.permits(b.tenant_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn has_conflict(
        &self,
        tenant_id: Uuid,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(overlaps(
            &tables,
            tenant_id,
            room_id,
            check_in,
            check_out,
            exclude_booking_id,
        ))
    }

    async fn create_booking_if_available(&self, booking: Booking) -> Result<Booking, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.rooms.contains_key(&booking.room_id) {
            return Err(AppError::NotFound("Room not found".to_string()));
        }
        if overlaps(
            &tables,
            booking.tenant_id,
            booking.room_id,
            booking.check_in_date,
            booking.check_out_date,
            None,
        ) {
            return Err(AppError::Conflict(
                "Room is not available for the requested dates".to_string(),
            ));
        }
        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_booking_versioned(
        &self,
        expected_version: i64,
        booking: &Booking,
    ) -> Result<Option<Booking>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(stored) = tables.bookings.get_mut(&booking.id) else {
            return Ok(None);
        };
        if stored.tenant_id != booking.tenant_id || stored.version != expected_version {
            return Ok(None);
        }
        let mut written = booking.clone();
        written.version = expected_version + 1;
        *stored = written.clone();
        Ok(Some(written))
    }
}

/// Audit sink that counts recorded events and keeps them for inspection.
#[derive(Clone, Default)]
pub struct CountingAuditSink {
    count: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl CountingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for CountingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), String> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
