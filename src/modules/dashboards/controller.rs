use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use dashgate_core::AppError;
use dashgate_models::{
    DashboardSetting, DashboardUserSetting, UpsertDashboardSettingDto,
    UpsertDashboardUserSettingDto, UserId,
};

use crate::middleware::auth::{RequireDashboardsManage, RequireDashboardsRead};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::DashboardService;

#[utoipa::path(
    get,
    path = "/api/dashboards/settings",
    responses(
        (status = 200, description = "Every stored dashboard setting", body = Vec<DashboardSetting>),
        (status = 403, description = "Missing dashboards:read", body = ErrorResponse)
    ),
    tag = "Dashboards",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_settings(
    State(state): State<AppState>,
    _auth: RequireDashboardsRead,
) -> Result<Json<Vec<DashboardSetting>>, AppError> {
    Ok(Json(DashboardService::list_settings(&state.db).await?))
}

#[utoipa::path(
    put,
    path = "/api/dashboards/settings",
    request_body = UpsertDashboardSettingDto,
    responses(
        (status = 200, description = "Setting saved", body = DashboardSetting),
        (status = 400, description = "Unknown users or users outside the organization", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Dashboards",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn upsert_setting(
    State(state): State<AppState>,
    _auth: RequireDashboardsManage,
    ValidatedJson(dto): ValidatedJson<UpsertDashboardSettingDto>,
) -> Result<Json<DashboardSetting>, AppError> {
    Ok(Json(DashboardService::upsert_setting(&state.db, dto).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboards/{dashboard_id}/settings",
    params(("dashboard_id" = String, Path, description = "Power BI report id")),
    responses(
        (status = 200, description = "Dashboard setting", body = DashboardSetting),
        (status = 404, description = "No setting stored", body = ErrorResponse)
    ),
    tag = "Dashboards",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_setting(
    State(state): State<AppState>,
    _auth: RequireDashboardsRead,
    Path(dashboard_id): Path<String>,
) -> Result<Json<DashboardSetting>, AppError> {
    Ok(Json(
        DashboardService::get_setting(&state.db, &dashboard_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/dashboards/{dashboard_id}/settings",
    params(("dashboard_id" = String, Path, description = "Power BI report id")),
    responses(
        (status = 204, description = "Setting deleted; the dashboard is hidden from everyone"),
        (status = 404, description = "No setting stored", body = ErrorResponse)
    ),
    tag = "Dashboards",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_setting(
    State(state): State<AppState>,
    _auth: RequireDashboardsManage,
    Path(dashboard_id): Path<String>,
) -> Result<StatusCode, AppError> {
    DashboardService::delete_setting(&state.db, &dashboard_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/dashboards/{dashboard_id}/users/{user_id}/settings",
    params(
        ("dashboard_id" = String, Path, description = "Power BI report id"),
        ("user_id" = UserId, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Per-user setting", body = DashboardUserSetting),
        (status = 404, description = "No per-user setting", body = ErrorResponse)
    ),
    tag = "Dashboards",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user_setting(
    State(state): State<AppState>,
    _auth: RequireDashboardsRead,
    Path((dashboard_id, user_id)): Path<(String, UserId)>,
) -> Result<Json<DashboardUserSetting>, AppError> {
    DashboardService::find_user_setting(&state.db, &dashboard_id, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Dashboard user setting not found")))
}

#[utoipa::path(
    put,
    path = "/api/dashboards/{dashboard_id}/users/{user_id}/settings",
    params(
        ("dashboard_id" = String, Path, description = "Power BI report id"),
        ("user_id" = UserId, Path, description = "User ID")
    ),
    request_body = UpsertDashboardUserSettingDto,
    responses(
        (status = 200, description = "Per-user setting saved", body = DashboardUserSetting),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Dashboards",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn upsert_user_setting(
    State(state): State<AppState>,
    _auth: RequireDashboardsManage,
    Path((dashboard_id, user_id)): Path<(String, UserId)>,
    ValidatedJson(dto): ValidatedJson<UpsertDashboardUserSettingDto>,
) -> Result<Json<DashboardUserSetting>, AppError> {
    Ok(Json(
        DashboardService::upsert_user_setting(&state.db, &dashboard_id, user_id, dto).await?,
    ))
}
