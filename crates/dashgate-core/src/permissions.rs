//! Permission constants and the role-to-permission table.
//!
//! Roles are fixed (`admin_master`, `admin`, `user`), so the permissions each
//! role grants are a static table rather than database rows. The strings are
//! embedded in access-token claims and checked by the `require_permission!`
//! middleware.

// =============================================================================
// Role slugs
// =============================================================================

pub const ROLE_ADMIN_MASTER: &str = "admin_master";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

// =============================================================================
// Users
// =============================================================================

/// Permission to list and read user profiles
pub const USERS_READ: &str = "users:read";
/// Permission to create, update, delete users and change their role
pub const USERS_MANAGE: &str = "users:manage";

// =============================================================================
// Organizations
// =============================================================================

pub const ORGANIZATIONS_READ: &str = "organizations:read";
pub const ORGANIZATIONS_MANAGE: &str = "organizations:manage";

// =============================================================================
// Power BI
// =============================================================================

/// Permission to manage tenant credentials
pub const CLIENTS_MANAGE: &str = "powerbi_clients:manage";
/// Permission to call the raw Power BI proxy
pub const POWERBI_PROXY: &str = "powerbi:proxy";
/// Permission to browse and embed reports the user is assigned to
pub const REPORTS_VIEW: &str = "reports:view";
/// Permission to list every report in a workspace regardless of settings
pub const REPORTS_BROWSE_ALL: &str = "reports:browse_all";

// =============================================================================
// Dashboards
// =============================================================================

pub const DASHBOARDS_READ: &str = "dashboards:read";
pub const DASHBOARDS_MANAGE: &str = "dashboards:manage";
pub const PAGE_PERMISSIONS_MANAGE: &str = "page_permissions:manage";
pub const TV_VIEW: &str = "tv:view";
pub const TV_MANAGE: &str = "tv:manage";

const ADMIN_MASTER_PERMISSIONS: &[&str] = &[
    USERS_READ,
    USERS_MANAGE,
    ORGANIZATIONS_READ,
    ORGANIZATIONS_MANAGE,
    CLIENTS_MANAGE,
    POWERBI_PROXY,
    REPORTS_VIEW,
    REPORTS_BROWSE_ALL,
    DASHBOARDS_READ,
    DASHBOARDS_MANAGE,
    PAGE_PERMISSIONS_MANAGE,
    TV_VIEW,
    TV_MANAGE,
];

const ADMIN_PERMISSIONS: &[&str] = &[
    USERS_READ,
    ORGANIZATIONS_READ,
    REPORTS_VIEW,
    DASHBOARDS_READ,
    TV_VIEW,
];

const USER_PERMISSIONS: &[&str] = &[REPORTS_VIEW];

/// Returns the permissions granted by a role slug. Unknown slugs grant nothing.
#[must_use]
pub fn permissions_for_role(role: &str) -> &'static [&'static str] {
    match role {
        ROLE_ADMIN_MASTER => ADMIN_MASTER_PERMISSIONS,
        ROLE_ADMIN => ADMIN_PERMISSIONS,
        ROLE_USER => USER_PERMISSIONS,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_master_has_every_admin_permission() {
        for perm in permissions_for_role(ROLE_ADMIN) {
            assert!(
                permissions_for_role(ROLE_ADMIN_MASTER).contains(perm),
                "admin_master is missing {}",
                perm
            );
        }
    }

    #[test]
    fn test_admin_can_view_tv_but_not_manage() {
        let perms = permissions_for_role(ROLE_ADMIN);
        assert!(perms.contains(&TV_VIEW));
        assert!(!perms.contains(&TV_MANAGE));
        assert!(!perms.contains(&DASHBOARDS_MANAGE));
    }

    #[test]
    fn test_user_only_views_reports() {
        assert_eq!(permissions_for_role(ROLE_USER), &[REPORTS_VIEW]);
    }

    #[test]
    fn test_unknown_role_has_nothing() {
        assert!(permissions_for_role("superuser").is_empty());
    }

    #[test]
    fn test_permission_format() {
        for perm in permissions_for_role(ROLE_ADMIN_MASTER) {
            let parts: Vec<&str> = perm.split(':').collect();
            assert_eq!(parts.len(), 2, "{} should be resource:action", perm);
        }
    }
}
