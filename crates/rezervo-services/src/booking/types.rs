//! Typed request payloads for the booking engine
//!
//! The request-handling layer parses and deserializes into these before
//! calling the service; `validator` constraints cover the field-level checks
//! that do not need store access.

use chrono::{DateTime, Utc};
use rezervo_core::models::BookingSource;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request to create a booking.
///
/// `tenant_id` is honored only for cross-tenant administrators; for every
/// other principal the tenant comes from the resolved scope.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub room_id: Uuid,
    pub guest_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "number_of_guests must be at least 1"))]
    pub number_of_guests: i32,
    #[serde(default)]
    pub source: Option<BookingSource>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Sparse patch over a booking's free-text fields. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookingDetailsPatch {
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

impl BookingDetailsPatch {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.special_requests.is_none()
    }
}
