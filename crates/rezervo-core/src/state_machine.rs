//! Booking status state machine
//!
//! Validates and applies status transitions. The edge check runs before the
//! permission check, and both run before any field is touched, so a denied
//! transition never leaves partial state behind.

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{Booking, BookingStatus};
use crate::permissions::{Permission, Principal};

/// Allowed outgoing edges per status. Terminal statuses have none.
pub fn allowed_targets(status: BookingStatus) -> &'static [BookingStatus] {
    match status {
        BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
        BookingStatus::Confirmed => &[
            BookingStatus::CheckedIn,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ],
        BookingStatus::CheckedIn => &[BookingStatus::CheckedOut],
        BookingStatus::CheckedOut | BookingStatus::Cancelled | BookingStatus::NoShow => &[],
    }
}

/// The permission gating entry into each target status. Marking a no-show is
/// gated like a cancellation.
pub fn required_permission(target: BookingStatus) -> Option<Permission> {
    match target {
        BookingStatus::Confirmed => Some(Permission::BookingConfirm),
        BookingStatus::Cancelled | BookingStatus::NoShow => Some(Permission::BookingCancel),
        BookingStatus::CheckedIn => Some(Permission::BookingCheckin),
        BookingStatus::CheckedOut => Some(Permission::BookingCheckout),
        BookingStatus::Pending => None,
    }
}

/// Validate and apply a status transition.
///
/// The general `booking:update` permission supersedes every status-specific
/// check. On success the status moves to `target` and the derived timestamps
/// are set: entering checked_in/checked_out stamps the actual times when
/// unset, entering cancelled stamps `cancelled_at` and stores a trimmed
/// cancellation reason when supplied.
pub fn apply_transition(
    booking: &mut Booking,
    target: BookingStatus,
    principal: &Principal,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !allowed_targets(booking.status).contains(&target) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot transition booking from {} to {}",
            booking.status, target
        )));
    }

    if !principal.has_permission(Permission::BookingUpdate) {
        if let Some(required) = required_permission(target) {
            if !principal.has_permission(required) {
                return Err(AppError::Forbidden(format!(
                    "Missing permission {} for transition to {}",
                    required, target
                )));
            }
        }
    }

    booking.status = target;
    match target {
        BookingStatus::CheckedIn => {
            if booking.actual_check_in.is_none() {
                booking.actual_check_in = Some(now);
            }
        }
        BookingStatus::CheckedOut => {
            if booking.actual_check_out.is_none() {
                booking.actual_check_out = Some(now);
            }
        }
        BookingStatus::Cancelled => {
            booking.cancelled_at = Some(now);
            if let Some(reason) = reason {
                let trimmed = reason.trim();
                if !trimmed.is_empty() {
                    booking.cancellation_reason = Some(trimmed.to_string());
                }
            }
        }
        _ => {}
    }
    booking.updated_at = now;
    Ok(())
}
