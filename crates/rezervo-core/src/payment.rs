//! Payment ledger rules
//!
//! The ledger is an append-only list of transactions embedded in the booking;
//! `paid_amount` is a cached sum over it. All validation and permission
//! checks complete before the first field is touched, so a rejected patch
//! never leaves a partially applied payment behind.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Booking, PaymentMethod, PaymentStatus, PaymentTransaction};
use crate::permissions::{Permission, Principal};

/// A payment to append to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Sparse payment patch from the calling layer. Each field is an independent,
/// independently permission-gated operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentPatch {
    #[serde(default)]
    pub add_payment: Option<AddPayment>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub paid_amount: Option<Decimal>,
}

impl PaymentPatch {
    pub fn is_empty(&self) -> bool {
        self.add_payment.is_none() && self.status.is_none() && self.paid_amount.is_none()
    }
}

/// Payment status derived from the paid amount against the pricing total.
/// `Refunded` is never derived; it only arrives via an explicit status write.
pub fn derive_status(paid_amount: Decimal, total: Decimal) -> PaymentStatus {
    if total > Decimal::ZERO && paid_amount >= total {
        PaymentStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Validate and apply a payment patch to a booking.
///
/// Application order: the transaction append first, then the paid-amount
/// override, then the explicit status (or the derived one when no explicit
/// status accompanies an amount change). A paid-amount override below the
/// ledger's transaction sum is rejected so the cached total never contradicts
/// the ledger.
pub fn apply_payment_patch(
    booking: &mut Booking,
    patch: &PaymentPatch,
    principal: &Principal,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if patch.is_empty() {
        return Err(AppError::Validation(
            "Payment update contains no operations".to_string(),
        ));
    }

    if !principal.has_permission(Permission::PaymentCreate) {
        return Err(AppError::Forbidden(
            "Missing permission payment:create".to_string(),
        ));
    }
    if patch.status == Some(PaymentStatus::Refunded)
        && !principal.has_permission(Permission::PaymentRefund)
    {
        return Err(AppError::Forbidden(
            "Missing permission payment:refund".to_string(),
        ));
    }

    if let Some(add) = &patch.add_payment {
        if add.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Payment amount must be greater than zero".to_string(),
            ));
        }
    }
    if let Some(amount) = patch.paid_amount {
        if amount < Decimal::ZERO {
            return Err(AppError::Validation(
                "Paid amount must not be negative".to_string(),
            ));
        }
        let prospective_ledger = booking.payment.ledger_total()
            + patch
                .add_payment
                .as_ref()
                .map(|a| a.amount)
                .unwrap_or(Decimal::ZERO);
        if amount < prospective_ledger {
            return Err(AppError::Validation(format!(
                "Paid amount {} is below the recorded transaction total {}",
                amount, prospective_ledger
            )));
        }
    }

    // All checks passed; apply in order.
    if let Some(add) = &patch.add_payment {
        booking.payment.transactions.push(PaymentTransaction {
            amount: add.amount,
            method: add.method,
            reference: add.reference.clone(),
            occurred_at: now,
        });
        booking.payment.paid_amount += add.amount;
    }
    if let Some(amount) = patch.paid_amount {
        booking.payment.paid_amount = amount;
    }
    match patch.status {
        Some(status) => booking.payment.status = status,
        None => {
            booking.payment.status =
                derive_status(booking.payment.paid_amount, booking.pricing.total);
        }
    }
    booking.updated_at = now;
    Ok(())
}
