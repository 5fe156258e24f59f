//! Payment ledger behavior through the service: transaction appends, derived
//! status, explicit overrides, and the refund permission gate.

use std::sync::Arc;

use rezervo_core::models::{BookingSource, PaymentMethod, PaymentStatus};
use rezervo_core::payment::{AddPayment, PaymentPatch};
use rezervo_core::{AppError, Role};
use rezervo_services::test_helpers::{
    guest_fixture, principal_fixture, room_fixture, stay_dates, tenant_fixture,
    CountingAuditSink, InMemoryBookingStore,
};
use rezervo_services::{BookingService, CreateBookingRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

struct TestEnv {
    service: BookingService,
    tenant_id: Uuid,
    booking_id: Uuid,
}

fn add_payment(amount: Decimal) -> PaymentPatch {
    PaymentPatch {
        add_payment: Some(AddPayment {
            amount,
            method: PaymentMethod::Card,
            reference: None,
        }),
        ..Default::default()
    }
}

/// A tenant with a 100/night room and one pending two-night booking,
/// total 200 (no tax).
async fn setup() -> TestEnv {
    let store = InMemoryBookingStore::new();
    let audit = CountingAuditSink::new();

    let tenant_id = Uuid::new_v4();
    store.add_tenant(tenant_fixture(tenant_id));
    let room = room_fixture(tenant_id, dec!(100));
    let room_id = room.id;
    store.add_room(room);
    let guest = guest_fixture(tenant_id);
    let guest_id = guest.id;
    store.add_guest(guest);

    let service = BookingService::new(Arc::new(store), Arc::new(audit));
    let manager = principal_fixture(Role::Manager, tenant_id);
    let (check_in, check_out) = stay_dates();
    let booking = service
        .create_booking(
            &manager,
            CreateBookingRequest {
                tenant_id: None,
                room_id,
                guest_id,
                check_in_date: check_in,
                check_out_date: check_out,
                number_of_guests: 1,
                source: Some(BookingSource::Website),
                special_requests: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(booking.pricing.total, dec!(200));

    TestEnv {
        service,
        tenant_id,
        booking_id: booking.id,
    }
}

#[tokio::test]
async fn test_ledger_drives_derived_status() {
    let env = setup().await;
    let receptionist = principal_fixture(Role::Receptionist, env.tenant_id);

    let partial = env
        .service
        .apply_payment_update(&receptionist, env.booking_id, add_payment(dec!(80)))
        .await
        .unwrap();
    assert_eq!(partial.payment.status, PaymentStatus::Partial);
    assert_eq!(partial.payment.paid_amount, dec!(80));
    assert_eq!(partial.payment.transactions.len(), 1);

    let paid = env
        .service
        .apply_payment_update(&receptionist, env.booking_id, add_payment(dec!(120)))
        .await
        .unwrap();
    assert_eq!(paid.payment.status, PaymentStatus::Paid);
    assert_eq!(paid.payment.paid_amount, dec!(200));
    assert_eq!(paid.payment.transactions.len(), 2);
}

#[tokio::test]
async fn test_refund_requires_refund_permission() {
    let env = setup().await;
    let receptionist = principal_fixture(Role::Receptionist, env.tenant_id);
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    let refund = PaymentPatch {
        status: Some(PaymentStatus::Refunded),
        ..Default::default()
    };

    let err = env
        .service
        .apply_payment_update(&receptionist, env.booking_id, refund.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let refunded = env
        .service
        .apply_payment_update(&manager, env.booking_id, refund)
        .await
        .unwrap();
    assert_eq!(refunded.payment.status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn test_viewer_cannot_record_payments() {
    let env = setup().await;
    let viewer = principal_fixture(Role::Viewer, env.tenant_id);

    let err = env
        .service
        .apply_payment_update(&viewer, env.booking_id, add_payment(dec!(50)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_empty_and_invalid_patches_rejected() {
    let env = setup().await;
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    let err = env
        .service
        .apply_payment_update(&manager, env.booking_id, PaymentPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = env
        .service
        .apply_payment_update(&manager, env.booking_id, add_payment(dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = env
        .service
        .apply_payment_update(&manager, env.booking_id, add_payment(dec!(-10)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_paid_amount_override_cannot_contradict_ledger() {
    let env = setup().await;
    let manager = principal_fixture(Role::Manager, env.tenant_id);

    env.service
        .apply_payment_update(&manager, env.booking_id, add_payment(dec!(150)))
        .await
        .unwrap();

    // Below the recorded transaction total.
    let err = env
        .service
        .apply_payment_update(
            &manager,
            env.booking_id,
            PaymentPatch {
                paid_amount: Some(dec!(100)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // At or above the ledger total is fine, e.g. an off-system payment.
    let updated = env
        .service
        .apply_payment_update(
            &manager,
            env.booking_id,
            PaymentPatch {
                paid_amount: Some(dec!(200)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.payment.paid_amount, dec!(200));
    assert_eq!(updated.payment.status, PaymentStatus::Paid);
    // The ledger itself is untouched by the override.
    assert_eq!(updated.payment.transactions.len(), 1);
}

#[tokio::test]
async fn test_rejected_patch_leaves_payment_untouched() {
    let env = setup().await;
    let manager = principal_fixture(Role::Manager, env.tenant_id);
    let receptionist = principal_fixture(Role::Receptionist, env.tenant_id);

    // Valid append plus an unauthorized refund: nothing may apply.
    let err = env
        .service
        .apply_payment_update(
            &receptionist,
            env.booking_id,
            PaymentPatch {
                add_payment: Some(AddPayment {
                    amount: dec!(50),
                    method: PaymentMethod::Cash,
                    reference: None,
                }),
                status: Some(PaymentStatus::Refunded),
                paid_amount: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let booking = env
        .service
        .get_booking(&manager, env.booking_id)
        .await
        .unwrap();
    assert!(booking.payment.transactions.is_empty());
    assert_eq!(booking.payment.paid_amount, Decimal::ZERO);
    assert_eq!(booking.payment.status, PaymentStatus::Pending);
}
