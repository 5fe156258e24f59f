//! Pricing calculator
//!
//! Pure function computing the pricing snapshot captured into a booking at
//! creation. The snapshot is never recomputed automatically afterward.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::Pricing;

const SECONDS_PER_DAY: i64 = 86_400;

/// Compute the pricing snapshot for a stay.
///
/// Nights are the ceiling of the stay duration in days, with a minimum of 1:
/// a 14:00 check-in against a 12:00 check-out the next day is one night, not
/// zero. Taxes are `subtotal * tax_rate_percent / 100`, rounded to cents.
pub fn compute_pricing(
    room_rate: Decimal,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    tax_rate_percent: Decimal,
) -> Result<Pricing, AppError> {
    let nights = nights_between(check_in, check_out)?;

    let subtotal = room_rate * Decimal::from(nights);
    let taxes = (subtotal * tax_rate_percent / Decimal::ONE_HUNDRED).round_dp(2);
    let discount = Decimal::ZERO;
    let total = subtotal + taxes - discount;

    Ok(Pricing {
        room_rate,
        nights,
        subtotal,
        taxes,
        discount,
        total,
    })
}

/// Ceiling of the stay duration in whole days, minimum 1.
pub fn nights_between(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<i64, AppError> {
    let seconds = (check_out - check_in).num_seconds();
    if seconds <= 0 {
        return Err(AppError::Validation(
            "Check-out date must be after check-in date".to_string(),
        ));
    }
    let nights = seconds.div_euclid(SECONDS_PER_DAY)
        + if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
            1
        } else {
            0
        };
    Ok(nights.max(1))
}
