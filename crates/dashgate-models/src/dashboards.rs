//! Dashboard (Power BI report) settings and the visibility rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{DashboardSettingId, DashboardUserSettingId, OrganizationId, UserId};
use crate::roles::AppRole;

/// Per-report settings. `dashboard_id` is the Power BI report id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DashboardSetting {
    pub id: DashboardSettingId,
    pub dashboard_id: String,
    pub is_visible: bool,
    pub assigned_users: Vec<UserId>,
    pub organization_id: Option<OrganizationId>,
    /// Default RLS role applied when a user has no role of their own
    pub rls_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertDashboardSettingDto {
    #[validate(length(min = 1, max = 200))]
    pub dashboard_id: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub assigned_users: Vec<UserId>,
    pub organization_id: Option<OrganizationId>,
    #[validate(length(max = 100))]
    pub rls_role: Option<String>,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DashboardUserSetting {
    pub id: DashboardUserSettingId,
    pub dashboard_id: String,
    pub user_id: UserId,
    pub rls_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertDashboardUserSettingDto {
    /// `null` or blank removes the user's own role, falling back to the dashboard default
    #[validate(length(max = 100))]
    pub rls_role: Option<String>,
}

/// Whether a dashboard appears in `user_id`'s report list.
///
/// No setting means nobody sees it. A hidden dashboard is hidden from every
/// role. `admin_master` sees every visible dashboard; everyone else must be in
/// `assigned_users`.
pub fn is_listed_for(setting: Option<&DashboardSetting>, user_id: UserId, role: AppRole) -> bool {
    let Some(setting) = setting else {
        return false;
    };

    if !setting.is_visible {
        return false;
    }

    role.is_admin_master() || setting.assigned_users.contains(&user_id)
}

/// The RLS role to embed with: the user's own setting wins over the
/// dashboard default. Blank strings count as unset.
pub fn resolve_rls_role(
    user_setting: Option<&DashboardUserSetting>,
    setting: Option<&DashboardSetting>,
) -> Option<String> {
    let non_blank = |role: &Option<String>| {
        role.as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    };

    user_setting
        .and_then(|s| non_blank(&s.rls_role))
        .or_else(|| setting.and_then(|s| non_blank(&s.rls_role)))
}

/// Removes duplicate user ids while keeping first-seen order.
pub fn dedup_user_ids(ids: &[UserId]) -> Vec<UserId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(is_visible: bool, assigned: Vec<UserId>) -> DashboardSetting {
        DashboardSetting {
            id: DashboardSettingId::new(),
            dashboard_id: "report-1".to_string(),
            is_visible,
            assigned_users: assigned,
            organization_id: None,
            rls_role: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user_setting(role: Option<&str>) -> DashboardUserSetting {
        DashboardUserSetting {
            id: DashboardUserSettingId::new(),
            dashboard_id: "report-1".to_string(),
            user_id: UserId::new(),
            rls_role: role.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_setting_is_hidden_from_everyone() {
        for role in AppRole::ALL {
            assert!(!is_listed_for(None, UserId::new(), role));
        }
    }

    #[test]
    fn test_hidden_dashboard_is_hidden_from_every_role() {
        let user = UserId::new();
        let s = setting(false, vec![user]);
        for role in AppRole::ALL {
            assert!(!is_listed_for(Some(&s), user, role), "{} should not see it", role);
        }
    }

    #[test]
    fn test_admin_master_sees_visible_unassigned() {
        let s = setting(true, vec![]);
        assert!(is_listed_for(Some(&s), UserId::new(), AppRole::AdminMaster));
    }

    #[test]
    fn test_other_roles_need_assignment() {
        let assigned = UserId::new();
        let s = setting(true, vec![assigned]);

        assert!(is_listed_for(Some(&s), assigned, AppRole::User));
        assert!(is_listed_for(Some(&s), assigned, AppRole::Admin));
        assert!(!is_listed_for(Some(&s), UserId::new(), AppRole::User));
        assert!(!is_listed_for(Some(&s), UserId::new(), AppRole::Admin));
    }

    #[test]
    fn test_rls_user_setting_wins() {
        let mut s = setting(true, vec![]);
        s.rls_role = Some("Region".to_string());

        assert_eq!(
            resolve_rls_role(Some(&user_setting(Some("Store"))), Some(&s)),
            Some("Store".to_string())
        );
        assert_eq!(
            resolve_rls_role(Some(&user_setting(Some("  "))), Some(&s)),
            Some("Region".to_string())
        );
        assert_eq!(resolve_rls_role(None, Some(&s)), Some("Region".to_string()));
        assert_eq!(resolve_rls_role(None, None), None);
    }

    #[test]
    fn test_upsert_dto_defaults() {
        let dto: UpsertDashboardSettingDto =
            serde_json::from_str(r#"{"dashboard_id":"abc"}"#).unwrap();
        assert!(dto.is_visible);
        assert!(dto.assigned_users.is_empty());
    }

    #[test]
    fn test_dedup_keeps_order() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(dedup_user_ids(&[a, b, a, b]), vec![a, b]);
    }
}
