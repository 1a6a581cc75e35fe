use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use dashgate_core::AppError;
use dashgate_core::permissions;
use dashgate_models::{
    NavigationCheckRequest, NavigationDecision, PageAccessResponse, PagePermission,
    ReplacePageUsersDto, UserId,
};

use crate::middleware::auth::{
    RequireDashboardsRead, RequirePagePermissionsManage, RequireReportsView,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::dashboards::DashboardService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::PagePermissionService;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AllowedPagesParams {
    /// Look up another user's access (requires `dashboards:read`)
    pub user_id: Option<UserId>,
}

#[utoipa::path(
    get,
    path = "/api/dashboards/{dashboard_id}/page-permissions",
    params(("dashboard_id" = String, Path, description = "Power BI report id")),
    responses(
        (status = 200, description = "Every page restriction on the dashboard", body = Vec<PagePermission>),
        (status = 403, description = "Missing dashboards:read", body = ErrorResponse)
    ),
    tag = "Page Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_page_permissions(
    State(state): State<AppState>,
    _auth: RequireDashboardsRead,
    Path(dashboard_id): Path<String>,
) -> Result<Json<Vec<PagePermission>>, AppError> {
    Ok(Json(
        PagePermissionService::list_for_dashboard(&state.db, &dashboard_id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/dashboards/{dashboard_id}/page-permissions",
    params(("dashboard_id" = String, Path, description = "Power BI report id")),
    request_body = ReplacePageUsersDto,
    responses(
        (status = 200, description = "The page's new rows", body = Vec<PagePermission>),
        (status = 400, description = "Unknown user", body = ErrorResponse),
        (status = 403, description = "Missing page_permissions:manage", body = ErrorResponse)
    ),
    tag = "Page Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn replace_page_users(
    State(state): State<AppState>,
    _auth: RequirePagePermissionsManage,
    Path(dashboard_id): Path<String>,
    ValidatedJson(dto): ValidatedJson<ReplacePageUsersDto>,
) -> Result<Json<Vec<PagePermission>>, AppError> {
    Ok(Json(
        PagePermissionService::replace_page_users(&state.db, &dashboard_id, dto).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/dashboards/{dashboard_id}/page-permissions/users/{user_id}",
    params(
        ("dashboard_id" = String, Path, description = "Power BI report id"),
        ("user_id" = UserId, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User can see every page again")
    ),
    tag = "Page Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn clear_user_page_permissions(
    State(state): State<AppState>,
    _auth: RequirePagePermissionsManage,
    Path((dashboard_id, user_id)): Path<(String, UserId)>,
) -> Result<StatusCode, AppError> {
    PagePermissionService::clear_user(&state.db, &dashboard_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/dashboards/{dashboard_id}/pages/allowed",
    params(
        ("dashboard_id" = String, Path, description = "Power BI report id"),
        AllowedPagesParams
    ),
    responses(
        (status = 200, description = "Pages the user may open", body = PageAccessResponse),
        (status = 403, description = "Dashboard not listed for the caller, or another user looked up without dashboards:read", body = ErrorResponse)
    ),
    tag = "Page Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn get_allowed_pages(
    State(state): State<AppState>,
    RequireReportsView(auth_user): RequireReportsView,
    Path(dashboard_id): Path<String>,
    params: Result<Query<AllowedPagesParams>, QueryRejection>,
) -> Result<Json<PageAccessResponse>, AppError> {
    let Query(params) = params
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid query parameters: {}", e)))?;

    let caller = auth_user.user_id()?;
    let user_id = match params.user_id {
        Some(other) if other != caller => {
            if !auth_user.has_permission(permissions::DASHBOARDS_READ) {
                return Err(AppError::forbidden(
                    "Access denied. Missing required permission: dashboards:read",
                ));
            }
            other
        }
        _ => {
            DashboardService::ensure_listed(&state.db, &dashboard_id, caller, auth_user.role())
                .await?;
            caller
        }
    };

    let access = PagePermissionService::allowed_pages(&state.db, &dashboard_id, user_id).await?;
    Ok(Json(PageAccessResponse {
        dashboard_id,
        access,
    }))
}

#[utoipa::path(
    post,
    path = "/api/dashboards/{dashboard_id}/pages/check",
    params(("dashboard_id" = String, Path, description = "Power BI report id")),
    request_body = NavigationCheckRequest,
    responses(
        (status = 200, description = "Allow, or the page to switch back to", body = NavigationDecision),
        (status = 403, description = "Dashboard not listed for the caller", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Page Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn check_navigation(
    State(state): State<AppState>,
    RequireReportsView(auth_user): RequireReportsView,
    Path(dashboard_id): Path<String>,
    ValidatedJson(request): ValidatedJson<NavigationCheckRequest>,
) -> Result<Json<NavigationDecision>, AppError> {
    let decision = PagePermissionService::check_navigation(
        &state.db,
        &dashboard_id,
        auth_user.user_id()?,
        auth_user.role(),
        &request,
    )
    .await?;
    Ok(Json(decision))
}
