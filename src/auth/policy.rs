//! Role policy: allow-list membership checks.
//!
//! There is no privilege hierarchy. An endpoint's allow-list must enumerate
//! every role it admits; `super_admin` passes an admin endpoint only because
//! that endpoint lists it.

use crate::db::UserRole;

/// Pure membership test: true iff `role` is literally in `allowed`.
pub fn is_allowed(role: UserRole, allowed: &[UserRole]) -> bool {
    allowed.contains(&role)
}

/// A role constraint attached to an [`Auth`](super::Auth) extractor.
///
/// An empty `ALLOWED` list means "any authenticated user"; the gate skips
/// the policy check entirely in that case.
pub trait RoleConstraint {
    /// Roles admitted by this constraint.
    const ALLOWED: &'static [UserRole];
    /// Message returned when an authenticated caller is not admitted.
    const DENIAL: &'static str;
}

/// Any authenticated user.
pub struct AnyRole;

impl RoleConstraint for AnyRole {
    const ALLOWED: &'static [UserRole] = &[];
    const DENIAL: &'static str = "Insufficient permissions";
}

/// Admin endpoints admit both admin and super admin, by explicit enumeration.
pub struct AdminOnly;

impl RoleConstraint for AdminOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::Admin, UserRole::SuperAdmin];
    const DENIAL: &'static str = "Only admins can access this endpoint";
}

/// Super admin endpoints admit super admin alone.
pub struct SuperAdminOnly;

impl RoleConstraint for SuperAdminOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::SuperAdmin];
    const DENIAL: &'static str = "Only super admins can access this endpoint";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_literal() {
        assert!(is_allowed(UserRole::User, &[UserRole::User]));
        assert!(is_allowed(
            UserRole::SuperAdmin,
            &[UserRole::Admin, UserRole::SuperAdmin]
        ));
        assert!(!is_allowed(UserRole::User, &[UserRole::Admin]));
    }

    #[test]
    fn test_no_hierarchy_inference() {
        // A super admin is NOT admitted by a list that only names admin.
        assert!(!is_allowed(UserRole::SuperAdmin, &[UserRole::Admin]));
        // An admin is NOT admitted by a list that only names super admin.
        assert!(!is_allowed(UserRole::Admin, &[UserRole::SuperAdmin]));
    }

    #[test]
    fn test_empty_list_admits_nobody() {
        // The gate treats an empty list as "skip the check"; the policy
        // itself admits nobody for it.
        assert!(!is_allowed(UserRole::SuperAdmin, &[]));
    }

    #[test]
    fn test_admin_only_enumerates_super_admin() {
        assert!(is_allowed(UserRole::Admin, AdminOnly::ALLOWED));
        assert!(is_allowed(UserRole::SuperAdmin, AdminOnly::ALLOWED));
        assert!(!is_allowed(UserRole::User, AdminOnly::ALLOWED));
    }

    #[test]
    fn test_super_admin_only() {
        assert!(is_allowed(UserRole::SuperAdmin, SuperAdminOnly::ALLOWED));
        assert!(!is_allowed(UserRole::Admin, SuperAdminOnly::ALLOWED));
        assert!(!is_allowed(UserRole::User, SuperAdminOnly::ALLOWED));
    }
}
