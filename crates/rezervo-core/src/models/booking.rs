use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Booking lifecycle status.
///
/// Transitions only move along the edges enforced by
/// [`crate::state_machine`]; a status never regresses or skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "booking_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Statuses that participate in room-availability conflict checks.
    pub const ACTIVE: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
    ];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::CheckedOut | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::CheckedIn => write!(f, "checked_in"),
            BookingStatus::CheckedOut => write!(f, "checked_out"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// Where the booking originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "booking_source", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Direct,
    Phone,
    Email,
    Website,
    WalkIn,
    Ota,
}

/// Payment status. `Refunded` is only reachable via an explicit,
/// permissioned status write; it is never derived from amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Partial => write!(f, "partial"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Online,
}

/// A single entry in the append-only payment ledger.
///
/// Transactions are never deleted or mutated after insertion and are ordered
/// by occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Payment sub-record embedded in a booking.
///
/// `paid_amount` is a cached sum over the ledger; it may be set directly by a
/// permissioned override but never below the ledger's transaction sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub status: PaymentStatus,
    pub paid_amount: Decimal,
    pub transactions: Vec<PaymentTransaction>,
}

impl PaymentRecord {
    pub fn new() -> Self {
        Self {
            status: PaymentStatus::Pending,
            paid_amount: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    /// Sum of all recorded transactions; the ledger is the source of truth.
    pub fn ledger_total(&self) -> Decimal {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}

impl Default for PaymentRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Pricing snapshot, computed once at booking creation and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub room_rate: Decimal,
    pub nights: i64,
    pub subtotal: Decimal,
    pub taxes: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Booking entity, the central record of the engine.
///
/// Belongs to exactly one tenant; the referenced room and guest belong to the
/// same tenant. `version` drives conditional writes so concurrent updates to
/// disjoint fields never silently clobber each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub room_id: Uuid,
    pub guest_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub number_of_guests: i32,
    pub status: BookingStatus,
    pub source: BookingSource,
    pub pricing: Pricing,
    pub payment: PaymentRecord,
    pub special_requests: Option<String>,
    pub notes: Option<String>,
    pub actual_check_in: Option<DateTime<Utc>>,
    pub actual_check_out: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
