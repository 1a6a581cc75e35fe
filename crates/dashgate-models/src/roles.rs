//! Application and organization roles.
//!
//! Both are Postgres enums. Each user holds exactly one [`AppRole`]; the
//! permission strings a role grants come from
//! [`dashgate_core::permissions::permissions_for_role`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use dashgate_core::permissions::{self, permissions_for_role};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    AdminMaster,
    Admin,
    #[default]
    User,
}

impl AppRole {
    pub const ALL: [AppRole; 3] = [AppRole::AdminMaster, AppRole::Admin, AppRole::User];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdminMaster => permissions::ROLE_ADMIN_MASTER,
            Self::Admin => permissions::ROLE_ADMIN,
            Self::User => permissions::ROLE_USER,
        }
    }

    pub fn permissions(&self) -> &'static [&'static str] {
        permissions_for_role(self.as_str())
    }

    pub fn is_admin_master(&self) -> bool {
        matches!(self, Self::AdminMaster)
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown role '{}'", s))
    }
}

/// Role of a user inside one organization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "organization_member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRole {
    Admin,
    #[default]
    Member,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for role in AppRole::ALL {
            assert_eq!(role.as_str().parse::<AppRole>().unwrap(), role);
        }
        assert!("sysadmin".parse::<AppRole>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppRole::AdminMaster).unwrap(),
            r#""admin_master""#
        );
        let role: OrganizationRole = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(role, OrganizationRole::Admin);
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(AppRole::default(), AppRole::User);
        assert_eq!(OrganizationRole::default(), OrganizationRole::Member);
    }

    #[test]
    fn test_only_admin_master_manages_users() {
        assert!(AppRole::AdminMaster.permissions().contains(&permissions::USERS_MANAGE));
        assert!(!AppRole::Admin.permissions().contains(&permissions::USERS_MANAGE));
        assert!(!AppRole::User.permissions().contains(&permissions::USERS_MANAGE));
    }
}
