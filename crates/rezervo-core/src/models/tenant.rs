use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "tenant_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Deleted,
}

/// Per-tenant booking settings, captured at booking creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Default check-in time of day, e.g. "14:00"
    pub check_in_time: String,
    /// Default check-out time of day, e.g. "12:00"
    pub check_out_time: String,
    /// Tax rate applied to booking subtotals, in percent
    pub tax_rate_percent: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            check_in_time: "14:00".to_string(),
            check_out_time: "12:00".to_string(),
            tax_rate_percent: Decimal::ZERO,
            currency: "USD".to_string(),
        }
    }
}

/// Tenant (hotel organization) entity.
///
/// All rooms, guests, bookings, and users are partitioned by tenant id. A
/// suspended or deleted tenant denies operations for its own users; only a
/// cross-tenant administrator keeps access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub status: TenantStatus,
    pub settings: TenantSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}
