use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use dashgate_auth::{Claims, verify_token};
use dashgate_core::AppError;
use dashgate_core::permissions;
use dashgate_models::{AppRole, UserId};

use crate::state::AppState;

/// Extractor that validates the bearer JWT and exposes the caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.permissions.iter().any(|p| p == permission)
    }

    pub fn user_id(&self) -> Result<UserId, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map(UserId::from)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// The role claimed by the token. Unknown slugs fall back to `user`.
    pub fn role(&self) -> AppRole {
        self.0.role.parse().unwrap_or_default()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that requires one permission on top of a valid token.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = dashgate_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                if !auth_user.has_permission($permission) {
                    return Err(dashgate_core::AppError::forbidden(format!(
                        "Access denied. Missing required permission: {}",
                        $permission
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

// Users
require_permission!(RequireUsersRead, permissions::USERS_READ);
require_permission!(RequireUsersManage, permissions::USERS_MANAGE);

// Organizations
require_permission!(RequireOrganizationsRead, permissions::ORGANIZATIONS_READ);
require_permission!(RequireOrganizationsManage, permissions::ORGANIZATIONS_MANAGE);

// Power BI
require_permission!(RequireClientsManage, permissions::CLIENTS_MANAGE);
require_permission!(RequirePowerBiProxy, permissions::POWERBI_PROXY);
require_permission!(RequireReportsView, permissions::REPORTS_VIEW);
require_permission!(RequireReportsBrowseAll, permissions::REPORTS_BROWSE_ALL);

// Dashboards
require_permission!(RequireDashboardsRead, permissions::DASHBOARDS_READ);
require_permission!(RequireDashboardsManage, permissions::DASHBOARDS_MANAGE);
require_permission!(RequirePagePermissionsManage, permissions::PAGE_PERMISSIONS_MANAGE);

// TV
require_permission!(RequireTvView, permissions::TV_VIEW);
require_permission!(RequireTvManage, permissions::TV_MANAGE);

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims_for(role: &str) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: role.to_string(),
            permissions: permissions::permissions_for_role(role)
                .iter()
                .map(|p| p.to_string())
                .collect(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_has_permission() {
        let auth_user = AuthUser(claims_for("admin"));

        assert!(auth_user.has_permission(permissions::USERS_READ));
        assert!(!auth_user.has_permission(permissions::USERS_MANAGE));
    }

    #[test]
    fn test_user_id() {
        let user_id = Uuid::new_v4();
        let mut claims = claims_for("user");
        claims.sub = user_id.to_string();

        assert_eq!(AuthUser(claims).user_id().unwrap(), UserId::from(user_id));
    }

    #[test]
    fn test_malformed_subject_is_unauthorized() {
        let mut claims = claims_for("user");
        claims.sub = "not-a-uuid".to_string();

        let err = AuthUser(claims).user_id().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_role() {
        assert_eq!(AuthUser(claims_for("admin_master")).role(), AppRole::AdminMaster);
        assert_eq!(AuthUser(claims_for("something-else")).role(), AppRole::User);
    }
}
