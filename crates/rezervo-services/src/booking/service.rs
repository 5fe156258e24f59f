//! Booking lifecycle service
//!
//! Every operation resolves the tenant scope first, evaluates all permission
//! and validation checks before the first write, and reports each mutation to
//! the audit sink fire-and-forget. Booking writes are conditional on the
//! record version and retried within a small fixed bound; exhaustion surfaces
//! `Conflict` to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rezervo_core::models::{
    Booking, BookingSource, BookingStatus, Guest, PaymentRecord, Room, Tenant,
};
use rezervo_core::payment::{apply_payment_patch, PaymentPatch};
use rezervo_core::pricing::{compute_pricing, nights_between};
use rezervo_core::state_machine::apply_transition;
use rezervo_core::{
    AppError, AuditEvent, AuditSink, Permission, Principal, TenantScope,
};
use rezervo_db::BookingStore;
use uuid::Uuid;
use validator::Validate;

use super::types::{BookingDetailsPatch, CreateBookingRequest};

/// Bound for the optimistic-concurrency retry loop on booking writes.
const DEFAULT_WRITE_RETRY_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    audit: Arc<dyn AuditSink>,
    write_retry_attempts: u32,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            audit,
            write_retry_attempts: DEFAULT_WRITE_RETRY_ATTEMPTS,
        }
    }

    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.write_retry_attempts = attempts.max(1);
        self
    }

    /// Create a booking: permission gate, input validation, tenant/room/guest
    /// resolution inside the tenant scope, pricing snapshot, then an atomic
    /// availability check plus insert.
    #[tracing::instrument(skip(self, principal, request), fields(user_id = %principal.user_id, room_id = %request.room_id))]
    pub async fn create_booking(
        &self,
        principal: &Principal,
        request: CreateBookingRequest,
    ) -> Result<Booking, AppError> {
        let scope = TenantScope::for_principal(principal)?;
        require(principal, Permission::BookingCreate)?;
        request.validate()?;
        // Rejects non-positive stay durations before any store access.
        nights_between(request.check_in_date, request.check_out_date)?;

        let tenant_id = match scope.tenant_filter() {
            Some(id) => id,
            None => request.tenant_id.ok_or_else(|| {
                AppError::Validation(
                    "tenant_id is required for cross-tenant administrators".to_string(),
                )
            })?,
        };
        let tenant = self.load_active_tenant(principal, tenant_id).await?;

        // Room and guest must belong to the booking's tenant; lookups are
        // scoped to it even for cross-tenant administrators so a foreign
        // reference is indistinguishable from a missing one.
        let entity_scope = TenantScope::Tenant(tenant_id);
        let room = self
            .store
            .get_room(entity_scope, request.room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;
        if !room.is_active {
            return Err(AppError::Validation("Room is not active".to_string()));
        }
        if request.number_of_guests > room.capacity {
            return Err(AppError::Validation(format!(
                "Room {} sleeps at most {} guests",
                room.number, room.capacity
            )));
        }
        self.store
            .get_guest(entity_scope, request.guest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))?;

        let pricing = compute_pricing(
            room.nightly_rate,
            request.check_in_date,
            request.check_out_date,
            tenant.settings.tax_rate_percent,
        )?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            tenant_id,
            room_id: request.room_id,
            guest_id: request.guest_id,
            check_in_date: request.check_in_date,
            check_out_date: request.check_out_date,
            number_of_guests: request.number_of_guests,
            status: BookingStatus::Pending,
            source: request.source.unwrap_or(BookingSource::Direct),
            pricing,
            payment: PaymentRecord::new(),
            special_requests: request.special_requests,
            notes: request.notes,
            actual_check_in: None,
            actual_check_out: None,
            cancelled_at: None,
            cancellation_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create_booking_if_available(booking).await?;
        self.report_audit(principal, "booking.create", &created, None, |b| {
            serde_json::to_value(b).ok()
        })
        .await;
        Ok(created)
    }

    /// Apply a status transition through the state machine, with a bounded
    /// optimistic retry on concurrent version changes.
    #[tracing::instrument(skip(self, principal), fields(user_id = %principal.user_id, booking_id = %booking_id, target = %target))]
    pub async fn transition_status(
        &self,
        principal: &Principal,
        booking_id: Uuid,
        target: BookingStatus,
        reason: Option<&str>,
    ) -> Result<Booking, AppError> {
        let scope = TenantScope::for_principal(principal)?;

        for _ in 0..self.write_retry_attempts {
            let current = self
                .store
                .get_booking(scope, booking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
            self.load_active_tenant(principal, current.tenant_id).await?;

            let before_status = current.status;
            let mut updated = current.clone();
            apply_transition(&mut updated, target, principal, reason, Utc::now())?;

            if let Some(written) = self
                .store
                .update_booking_versioned(current.version, &updated)
                .await?
            {
                self.report_audit(
                    principal,
                    "booking.status_transition",
                    &written,
                    Some(serde_json::json!({ "status": before_status })),
                    |b| {
                        Some(serde_json::json!({
                            "status": b.status,
                            "cancelled_at": b.cancelled_at,
                            "actual_check_in": b.actual_check_in,
                            "actual_check_out": b.actual_check_out,
                        }))
                    },
                )
                .await;
                return Ok(written);
            }
            tracing::debug!(booking_id = %booking_id, "version conflict on transition, retrying");
        }
        Err(AppError::Conflict(
            "Booking was modified concurrently; retries exhausted".to_string(),
        ))
    }

    /// Apply a sparse payment patch (transaction append, explicit status,
    /// paid-amount override) to the booking's payment sub-record.
    #[tracing::instrument(skip(self, principal, patch), fields(user_id = %principal.user_id, booking_id = %booking_id))]
    pub async fn apply_payment_update(
        &self,
        principal: &Principal,
        booking_id: Uuid,
        patch: PaymentPatch,
    ) -> Result<Booking, AppError> {
        let scope = TenantScope::for_principal(principal)?;

        for _ in 0..self.write_retry_attempts {
            let current = self
                .store
                .get_booking(scope, booking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
            self.load_active_tenant(principal, current.tenant_id).await?;

            let before_payment = serde_json::to_value(&current.payment).ok();
            let mut updated = current.clone();
            apply_payment_patch(&mut updated, &patch, principal, Utc::now())?;

            if let Some(written) = self
                .store
                .update_booking_versioned(current.version, &updated)
                .await?
            {
                self.report_audit(
                    principal,
                    "booking.payment_update",
                    &written,
                    before_payment,
                    |b| serde_json::to_value(&b.payment).ok(),
                )
                .await;
                return Ok(written);
            }
            tracing::debug!(booking_id = %booking_id, "version conflict on payment update, retrying");
        }
        Err(AppError::Conflict(
            "Booking was modified concurrently; retries exhausted".to_string(),
        ))
    }

    /// Update the booking's free-text fields. Absent patch fields are left
    /// untouched; the conditional write guarantees a concurrent transition is
    /// never silently clobbered.
    #[tracing::instrument(skip(self, principal, patch), fields(user_id = %principal.user_id, booking_id = %booking_id))]
    pub async fn update_details(
        &self,
        principal: &Principal,
        booking_id: Uuid,
        patch: BookingDetailsPatch,
    ) -> Result<Booking, AppError> {
        let scope = TenantScope::for_principal(principal)?;
        require(principal, Permission::BookingUpdate)?;
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::Validation(
                "Update contains no fields".to_string(),
            ));
        }

        for _ in 0..self.write_retry_attempts {
            let current = self
                .store
                .get_booking(scope, booking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
            self.load_active_tenant(principal, current.tenant_id).await?;

            let before = serde_json::json!({
                "notes": current.notes,
                "special_requests": current.special_requests,
            });
            let mut updated = current.clone();
            if let Some(notes) = &patch.notes {
                updated.notes = Some(notes.clone());
            }
            if let Some(requests) = &patch.special_requests {
                updated.special_requests = Some(requests.clone());
            }
            updated.updated_at = Utc::now();

            if let Some(written) = self
                .store
                .update_booking_versioned(current.version, &updated)
                .await?
            {
                self.report_audit(
                    principal,
                    "booking.update_details",
                    &written,
                    Some(before),
                    |b| {
                        Some(serde_json::json!({
                            "notes": b.notes,
                            "special_requests": b.special_requests,
                        }))
                    },
                )
                .await;
                return Ok(written);
            }
            tracing::debug!(booking_id = %booking_id, "version conflict on details update, retrying");
        }
        Err(AppError::Conflict(
            "Booking was modified concurrently; retries exhausted".to_string(),
        ))
    }

    /// Whether the room is free over `[check_in, check_out)`, considering
    /// only active bookings and optionally excluding one booking id.
    #[tracing::instrument(skip(self, principal), fields(user_id = %principal.user_id, room_id = %room_id))]
    pub async fn check_availability(
        &self,
        principal: &Principal,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let scope = TenantScope::for_principal(principal)?;
        require(principal, Permission::BookingRead)?;
        nights_between(check_in, check_out)?;

        let room = self
            .store
            .get_room(scope, room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let conflict = self
            .store
            .has_conflict(room.tenant_id, room_id, check_in, check_out, exclude_booking_id)
            .await?;
        Ok(!conflict)
    }

    #[tracing::instrument(skip(self, principal), fields(user_id = %principal.user_id, booking_id = %booking_id))]
    pub async fn get_booking(
        &self,
        principal: &Principal,
        booking_id: Uuid,
    ) -> Result<Booking, AppError> {
        let scope = TenantScope::for_principal(principal)?;
        require(principal, Permission::BookingRead)?;
        self.store
            .get_booking(scope, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    #[tracing::instrument(skip(self, principal), fields(user_id = %principal.user_id, room_id = %room_id))]
    pub async fn get_room(
        &self,
        principal: &Principal,
        room_id: Uuid,
    ) -> Result<Room, AppError> {
        let scope = TenantScope::for_principal(principal)?;
        require(principal, Permission::RoomRead)?;
        self.store
            .get_room(scope, room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
    }

    #[tracing::instrument(skip(self, principal), fields(user_id = %principal.user_id, guest_id = %guest_id))]
    pub async fn get_guest(
        &self,
        principal: &Principal,
        guest_id: Uuid,
    ) -> Result<Guest, AppError> {
        let scope = TenantScope::for_principal(principal)?;
        require(principal, Permission::GuestRead)?;
        self.store
            .get_guest(scope, guest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))
    }

    #[tracing::instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn list_bookings(
        &self,
        principal: &Principal,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, AppError> {
        let scope = TenantScope::for_principal(principal)?;
        require(principal, Permission::BookingRead)?;
        self.store.list_bookings(scope, limit, offset).await
    }

    /// Load the tenant and enforce the active flag. An inactive tenant denies
    /// all operations for its own users; cross-tenant administrators keep
    /// access.
    async fn load_active_tenant(
        &self,
        principal: &Principal,
        tenant_id: Uuid,
    ) -> Result<Tenant, AppError> {
        let tenant = self
            .store
            .get_tenant(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
        if !tenant.is_active() && !principal.is_cross_tenant_admin() {
            return Err(AppError::Forbidden("Tenant is not active".to_string()));
        }
        Ok(tenant)
    }

    /// Report a mutation to the audit sink. Failures are logged and never
    /// propagate into the business operation.
    async fn report_audit<F>(
        &self,
        principal: &Principal,
        action: &str,
        booking: &Booking,
        before: Option<serde_json::Value>,
        after: F,
    ) where
        F: FnOnce(&Booking) -> Option<serde_json::Value>,
    {
        let event = AuditEvent {
            actor_id: principal.user_id,
            action: action.to_string(),
            entity_type: "booking".to_string(),
            entity_id: booking.id,
            tenant_id: Some(booking.tenant_id),
            before,
            after: after(booking),
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.audit.record(event).await {
            tracing::error!(error = %e, action = action, "failed to record audit entry");
        }
    }
}

fn require(principal: &Principal, permission: Permission) -> Result<(), AppError> {
    if principal.has_permission(permission) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Missing permission {}",
            permission
        )))
    }
}
