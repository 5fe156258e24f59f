//! Test doubles and fixtures shared by unit and integration tests.

pub mod mock_store;

pub use mock_store::{CountingAuditSink, InMemoryBookingStore};

use chrono::{TimeZone, Utc};
use rezervo_core::models::{Guest, Room, Tenant, TenantSettings, TenantStatus};
use rezervo_core::{Permission, Principal, Role};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn tenant_fixture(id: Uuid) -> Tenant {
    let now = Utc::now();
    Tenant {
        id,
        name: "Grand Palms Hotel".to_string(),
        status: TenantStatus::Active,
        settings: TenantSettings::default(),
        created_at: now,
        updated_at: now,
    }
}

pub fn room_fixture(tenant_id: Uuid, nightly_rate: Decimal) -> Room {
    let now = Utc::now();
    Room {
        id: Uuid::new_v4(),
        tenant_id,
        number: "204".to_string(),
        room_type: Some("double".to_string()),
        nightly_rate,
        capacity: 2,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn guest_fixture(tenant_id: Uuid) -> Guest {
    let now = Utc::now();
    Guest {
        id: Uuid::new_v4(),
        tenant_id,
        first_name: "Ada".to_string(),
        last_name: "Okafor".to_string(),
        email: Some("ada.okafor@example.com".to_string()),
        phone: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn principal_fixture(role: Role, tenant_id: Uuid) -> Principal {
    Principal::new(Uuid::new_v4(), role, Some(tenant_id))
}

pub fn super_admin_fixture() -> Principal {
    Principal::new(Uuid::new_v4(), Role::SuperAdmin, None)
}

pub fn principal_with_extra(
    role: Role,
    tenant_id: Uuid,
    extra: &[Permission],
) -> Principal {
    let mut principal = Principal::new(Uuid::new_v4(), role, Some(tenant_id));
    principal.custom_permissions.extend(extra.iter().copied());
    principal
}

/// A two-night stay: check-in 2026-06-01 14:00, check-out 2026-06-03 12:00.
pub fn stay_dates() -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2026, 6, 1, 14, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 6, 3, 12, 0, 0).unwrap(),
    )
}
