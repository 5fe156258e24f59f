//! Authorization model
//!
//! Roles are a flat enumeration ranked by a numeric hierarchy, each mapped to
//! a static default permission set. Custom per-user permissions are strictly
//! additive: they can grant beyond the role defaults but never revoke them.
//! All checks are side-effect free and must run before any write is attempted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Fixed enumeration of permission strings, grouped by resource:action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "booking:create")]
    BookingCreate,
    #[serde(rename = "booking:read")]
    BookingRead,
    #[serde(rename = "booking:update")]
    BookingUpdate,
    #[serde(rename = "booking:confirm")]
    BookingConfirm,
    #[serde(rename = "booking:cancel")]
    BookingCancel,
    #[serde(rename = "booking:checkin")]
    BookingCheckin,
    #[serde(rename = "booking:checkout")]
    BookingCheckout,
    #[serde(rename = "payment:create")]
    PaymentCreate,
    #[serde(rename = "payment:refund")]
    PaymentRefund,
    #[serde(rename = "room:read")]
    RoomRead,
    #[serde(rename = "guest:read")]
    GuestRead,
    #[serde(rename = "user:manage")]
    UserManage,
}

impl Permission {
    pub const ALL: [Permission; 12] = [
        Permission::BookingCreate,
        Permission::BookingRead,
        Permission::BookingUpdate,
        Permission::BookingConfirm,
        Permission::BookingCancel,
        Permission::BookingCheckin,
        Permission::BookingCheckout,
        Permission::PaymentCreate,
        Permission::PaymentRefund,
        Permission::RoomRead,
        Permission::GuestRead,
        Permission::UserManage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::BookingCreate => "booking:create",
            Permission::BookingRead => "booking:read",
            Permission::BookingUpdate => "booking:update",
            Permission::BookingConfirm => "booking:confirm",
            Permission::BookingCancel => "booking:cancel",
            Permission::BookingCheckin => "booking:checkin",
            Permission::BookingCheckout => "booking:checkout",
            Permission::PaymentCreate => "payment:create",
            Permission::PaymentRefund => "payment:refund",
            Permission::RoomRead => "room:read",
            Permission::GuestRead => "guest:read",
            Permission::UserManage => "user:manage",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// User role for authorization, ranked by hierarchy. The rank is used only
/// for "can manage" decisions between principals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Receptionist,
    Viewer,
}

impl Role {
    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 100,
            Role::Admin => 80,
            Role::Manager => 60,
            Role::Receptionist => 40,
            Role::Viewer => 20,
        }
    }

    /// Default permission set per role. SuperAdmin's set is the union of all
    /// permissions.
    pub fn default_permissions(&self) -> &'static [Permission] {
        match self {
            Role::SuperAdmin => &Permission::ALL,
            Role::Admin => &[
                Permission::BookingCreate,
                Permission::BookingRead,
                Permission::BookingUpdate,
                Permission::BookingConfirm,
                Permission::BookingCancel,
                Permission::BookingCheckin,
                Permission::BookingCheckout,
                Permission::PaymentCreate,
                Permission::PaymentRefund,
                Permission::RoomRead,
                Permission::GuestRead,
                Permission::UserManage,
            ],
            Role::Manager => &[
                Permission::BookingCreate,
                Permission::BookingRead,
                Permission::BookingUpdate,
                Permission::BookingConfirm,
                Permission::BookingCancel,
                Permission::BookingCheckin,
                Permission::BookingCheckout,
                Permission::PaymentCreate,
                Permission::PaymentRefund,
                Permission::RoomRead,
                Permission::GuestRead,
            ],
            Role::Receptionist => &[
                Permission::BookingCreate,
                Permission::BookingRead,
                Permission::BookingConfirm,
                Permission::BookingCheckin,
                Permission::BookingCheckout,
                Permission::PaymentCreate,
                Permission::RoomRead,
                Permission::GuestRead,
            ],
            Role::Viewer => &[
                Permission::BookingRead,
                Permission::RoomRead,
                Permission::GuestRead,
            ],
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::SuperAdmin => write!(f, "super_admin"),
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Receptionist => write!(f, "receptionist"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// The authenticated actor making a request.
///
/// `tenant_id` is `None` only for cross-tenant administrators; every other
/// role must carry a resolvable tenant id or all operations fail closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub custom_permissions: HashSet<Permission>,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role, tenant_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            role,
            tenant_id,
            custom_permissions: HashSet::new(),
        }
    }

    /// Role defaults plus custom grants. Custom permissions are strictly
    /// additive; there is no path to subtract a role's defaults per-user.
    pub fn effective_permissions(&self) -> HashSet<Permission> {
        let mut set: HashSet<Permission> =
            self.role.default_permissions().iter().copied().collect();
        set.extend(self.custom_permissions.iter().copied());
        set
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.default_permissions().contains(&permission)
            || self.custom_permissions.contains(&permission)
    }

    /// A principal may administer another principal only if its rank is
    /// strictly greater than the target's.
    pub fn can_manage(&self, target: Role) -> bool {
        self.role.rank() > target.rank()
    }

    /// Cross-tenant administrators may query without a tenant filter.
    pub fn is_cross_tenant_admin(&self) -> bool {
        self.role == Role::SuperAdmin && self.tenant_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), role, Some(Uuid::new_v4()))
    }

    #[test]
    fn test_super_admin_holds_every_permission() {
        let p = Principal::new(Uuid::new_v4(), Role::SuperAdmin, None);
        for permission in Permission::ALL {
            assert!(p.has_permission(permission), "missing {}", permission);
        }
    }

    #[test]
    fn test_viewer_cannot_mutate() {
        let p = principal(Role::Viewer);
        assert!(p.has_permission(Permission::BookingRead));
        assert!(!p.has_permission(Permission::BookingCreate));
        assert!(!p.has_permission(Permission::BookingCancel));
        assert!(!p.has_permission(Permission::PaymentCreate));
    }

    #[test]
    fn test_receptionist_cannot_cancel_or_refund() {
        let p = principal(Role::Receptionist);
        assert!(p.has_permission(Permission::BookingCheckin));
        assert!(p.has_permission(Permission::PaymentCreate));
        assert!(!p.has_permission(Permission::BookingCancel));
        assert!(!p.has_permission(Permission::PaymentRefund));
        assert!(!p.has_permission(Permission::BookingUpdate));
    }

    #[test]
    fn test_custom_permissions_are_additive() {
        let mut p = principal(Role::Receptionist);
        assert!(!p.has_permission(Permission::PaymentRefund));

        p.custom_permissions.insert(Permission::PaymentRefund);
        assert!(p.has_permission(Permission::PaymentRefund));

        // Role defaults can never be revoked by the custom set.
        let effective = p.effective_permissions();
        for permission in Role::Receptionist.default_permissions() {
            assert!(effective.contains(permission));
        }
    }

    #[test]
    fn test_can_manage_requires_strictly_greater_rank() {
        assert!(principal(Role::Admin).can_manage(Role::Manager));
        assert!(principal(Role::Manager).can_manage(Role::Receptionist));
        assert!(!principal(Role::Manager).can_manage(Role::Manager));
        assert!(!principal(Role::Receptionist).can_manage(Role::Admin));
        assert!(principal(Role::SuperAdmin).can_manage(Role::Admin));
        assert!(!principal(Role::SuperAdmin).can_manage(Role::SuperAdmin));
    }

    #[test]
    fn test_cross_tenant_admin_requires_super_admin_without_tenant() {
        let cross = Principal::new(Uuid::new_v4(), Role::SuperAdmin, None);
        assert!(cross.is_cross_tenant_admin());

        let scoped_super = principal(Role::SuperAdmin);
        assert!(!scoped_super.is_cross_tenant_admin());

        let admin = Principal::new(Uuid::new_v4(), Role::Admin, None);
        assert!(!admin.is_cross_tenant_admin());
    }

    #[test]
    fn test_permission_serializes_as_resource_action() {
        assert_eq!(
            serde_json::to_string(&Permission::BookingCheckin).unwrap(),
            "\"booking:checkin\""
        );
        assert_eq!(Permission::PaymentRefund.as_str(), "payment:refund");
    }
}
