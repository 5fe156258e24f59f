//! Tenant scoping
//!
//! Every repository query is intersected with a `TenantScope` so no
//! tenant-scoped principal can read or write another tenant's data. The scope
//! is resolved once per request from the principal and fails closed: a
//! tenant-scoped principal with no resolvable tenant id is denied rather than
//! defaulting to "all tenants".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::permissions::Principal;

/// Resolved data-access scope for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantScope {
    /// Restrict every query to this tenant id.
    Tenant(Uuid),
    /// Cross-tenant administrator: no tenant filter applied.
    Global,
}

impl TenantScope {
    /// Resolve the scope for a principal, failing closed when a tenant-scoped
    /// principal carries no tenant id.
    pub fn for_principal(principal: &Principal) -> Result<Self, AppError> {
        if principal.is_cross_tenant_admin() {
            return Ok(TenantScope::Global);
        }
        match principal.tenant_id {
            Some(tenant_id) => Ok(TenantScope::Tenant(tenant_id)),
            None => Err(AppError::Forbidden(
                "No tenant scope resolvable for principal".to_string(),
            )),
        }
    }

    /// The tenant filter to intersect with a query, or `None` for global scope.
    pub fn tenant_filter(&self) -> Option<Uuid> {
        match self {
            TenantScope::Tenant(id) => Some(*id),
            TenantScope::Global => None,
        }
    }

    /// Whether a document with the given tenant id is visible in this scope.
    pub fn permits(&self, tenant_id: Uuid) -> bool {
        match self {
            TenantScope::Tenant(id) => *id == tenant_id,
            TenantScope::Global => true,
        }
    }
}
