//! End-to-end booking lifecycle: creation, pricing snapshot, status
//! transitions, and the permission gates along the way.

use std::sync::Arc;

use rezervo_core::models::{BookingSource, BookingStatus};
use rezervo_core::{AppError, Permission, Role};
use rezervo_services::test_helpers::{
    guest_fixture, principal_fixture, principal_with_extra, room_fixture, stay_dates,
    tenant_fixture, CountingAuditSink, InMemoryBookingStore,
};
use rezervo_services::{BookingDetailsPatch, BookingService, CreateBookingRequest};
use rust_decimal_macros::dec;
use uuid::Uuid;

struct TestEnv {
    store: InMemoryBookingStore,
    audit: CountingAuditSink,
    service: BookingService,
    tenant_id: Uuid,
    room_id: Uuid,
    guest_id: Uuid,
}

fn setup() -> TestEnv {
    let store = InMemoryBookingStore::new();
    let audit = CountingAuditSink::new();

    let tenant_id = Uuid::new_v4();
    let mut tenant = tenant_fixture(tenant_id);
    tenant.settings.tax_rate_percent = dec!(15);
    store.add_tenant(tenant);

    let room = room_fixture(tenant_id, dec!(300));
    let room_id = room.id;
    store.add_room(room);

    let guest = guest_fixture(tenant_id);
    let guest_id = guest.id;
    store.add_guest(guest);

    let service = BookingService::new(Arc::new(store.clone()), Arc::new(audit.clone()));
    TestEnv {
        store,
        audit,
        service,
        tenant_id,
        room_id,
        guest_id,
    }
}

fn request(env: &TestEnv) -> CreateBookingRequest {
    let (check_in, check_out) = stay_dates();
    CreateBookingRequest {
        tenant_id: None,
        room_id: env.room_id,
        guest_id: env.guest_id,
        check_in_date: check_in,
        check_out_date: check_out,
        number_of_guests: 2,
        source: Some(BookingSource::Phone),
        special_requests: Some("High floor".to_string()),
        notes: None,
    }
}

#[tokio::test]
async fn test_create_booking_snapshots_pricing() {
    let env = setup();
    let receptionist = principal_fixture(Role::Receptionist, env.tenant_id);

    let booking = env
        .service
        .create_booking(&receptionist, request(&env))
        .await
        .expect("receptionist should be able to create a booking");

    // Two nights at 300 with 15% tax.
    assert_eq!(booking.pricing.nights, 2);
    assert_eq!(booking.pricing.subtotal, dec!(600));
    assert_eq!(booking.pricing.taxes, dec!(90.00));
    assert_eq!(booking.pricing.total, dec!(690.00));

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.source, BookingSource::Phone);
    assert_eq!(booking.version, 1);
    assert!(booking.payment.transactions.is_empty());
    assert_eq!(env.audit.count(), 1);
}

#[tokio::test]
async fn test_full_lifecycle_to_checkout() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    let confirmed = env
        .service
        .transition_status(&manager, booking.id, BookingStatus::Confirmed, None)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(confirmed.version, 2);

    let checked_in = env
        .service
        .transition_status(&manager, booking.id, BookingStatus::CheckedIn, None)
        .await
        .unwrap();
    assert!(checked_in.actual_check_in.is_some());

    let checked_out = env
        .service
        .transition_status(&manager, booking.id, BookingStatus::CheckedOut, None)
        .await
        .unwrap();
    assert_eq!(checked_out.status, BookingStatus::CheckedOut);
    assert!(checked_out.actual_check_out.is_some());
    assert_eq!(checked_out.version, 4);

    // Terminal: nothing transitions out of checked_out.
    let err = env
        .service
        .transition_status(&manager, booking.id, BookingStatus::Cancelled, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_cannot_skip_confirmation() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    let err = env
        .service
        .transition_status(&manager, booking.id, BookingStatus::CheckedIn, None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::InvalidTransition(_)),
        "pending booking must not check in directly, got {err:?}"
    );
}

#[tokio::test]
async fn test_cancellation_stamps_reason() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    let cancelled = env
        .service
        .transition_status(
            &manager,
            booking.id,
            BookingStatus::Cancelled,
            Some("  guest requested  "),
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(
        cancelled.cancellation_reason.as_deref(),
        Some("guest requested")
    );
}

#[tokio::test]
async fn test_transition_permission_gates() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);
    let receptionist = principal_fixture(Role::Receptionist, env.tenant_id);
    let viewer = principal_fixture(Role::Viewer, env.tenant_id);

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    // Viewer holds booking:read only.
    let err = env
        .service
        .transition_status(&viewer, booking.id, BookingStatus::Confirmed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Receptionist may confirm but not cancel.
    let err = env
        .service
        .transition_status(&receptionist, booking.id, BookingStatus::Cancelled, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    env.service
        .transition_status(&receptionist, booking.id, BookingStatus::Confirmed, None)
        .await
        .expect("receptionist holds booking:confirm");
}

#[tokio::test]
async fn test_booking_update_supersedes_per_transition_permission() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);
    let receptionist_plus = principal_with_extra(
        Role::Receptionist,
        env.tenant_id,
        &[Permission::BookingUpdate],
    );

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    // booking:update alone authorizes any valid edge, including cancel.
    let cancelled = env
        .service
        .transition_status(&receptionist_plus, booking.id, BookingStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_cancelled_booking_frees_the_room() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    let err = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    env.service
        .transition_status(&manager, booking.id, BookingStatus::Cancelled, None)
        .await
        .unwrap();

    env.service
        .create_booking(&manager, request(&env))
        .await
        .expect("cancelled booking no longer blocks the dates");
    assert_eq!(env.store.booking_count(), 2);
}

#[tokio::test]
async fn test_create_validation_failures() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    // Too many guests for the room.
    let mut req = request(&env);
    req.number_of_guests = 5;
    let err = env.service.create_booking(&manager, req).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Check-out not after check-in.
    let mut req = request(&env);
    req.check_out_date = req.check_in_date;
    let err = env.service.create_booking(&manager, req).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Unknown guest.
    let mut req = request(&env);
    req.guest_id = Uuid::new_v4();
    let err = env.service.create_booking(&manager, req).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Unknown room.
    let mut req = request(&env);
    req.room_id = Uuid::new_v4();
    let err = env.service.create_booking(&manager, req).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_viewer_cannot_create() {
    let env = setup();
    let viewer = principal_fixture(Role::Viewer, env.tenant_id);

    let err = env
        .service
        .create_booking(&viewer, request(&env))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(env.store.booking_count(), 0);
}

#[tokio::test]
async fn test_check_availability() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);
    let (check_in, check_out) = stay_dates();

    assert!(env
        .service
        .check_availability(&manager, env.room_id, check_in, check_out, None)
        .await
        .unwrap());

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    assert!(!env
        .service
        .check_availability(&manager, env.room_id, check_in, check_out, None)
        .await
        .unwrap());

    // Excluding the booking itself, e.g. when rescheduling.
    assert!(env
        .service
        .check_availability(&manager, env.room_id, check_in, check_out, Some(booking.id))
        .await
        .unwrap());

    // Back-to-back stay starting at the previous check-out is not an overlap.
    let (_, next_start) = stay_dates();
    let next_end = next_start + chrono::Duration::days(2);
    assert!(env
        .service
        .check_availability(&manager, env.room_id, next_start, next_end, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_room_and_guest_lookups() {
    let env = setup();
    let viewer = principal_fixture(Role::Viewer, env.tenant_id);

    let room = env.service.get_room(&viewer, env.room_id).await.unwrap();
    assert_eq!(room.tenant_id, env.tenant_id);

    let guest = env.service.get_guest(&viewer, env.guest_id).await.unwrap();
    assert_eq!(guest.tenant_id, env.tenant_id);

    let err = env
        .service
        .get_room(&viewer, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_details_is_sparse() {
    let env = setup();
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    let booking = env
        .service
        .create_booking(&manager, request(&env))
        .await
        .unwrap();

    let updated = env
        .service
        .update_details(
            &manager,
            booking.id,
            BookingDetailsPatch {
                notes: Some("VIP".to_string()),
                special_requests: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("VIP"));
    // Untouched field keeps its value.
    assert_eq!(updated.special_requests.as_deref(), Some("High floor"));
    assert_eq!(updated.version, 2);

    let err = env
        .service
        .update_details(&manager, booking.id, BookingDetailsPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
