use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use dashgate_core::AppError;
use dashgate_core::permissions;
use dashgate_models::PowerBiClientId;
use dashgate_powerbi::{Report, ReportPage, Workspace};

use crate::middleware::auth::{AuthUser, RequireReportsBrowseAll, RequireReportsView};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

use super::service::{EmbedResponse, ReportService, Viewer};

/// Selects the stored Power BI client; the oldest one is used when omitted.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientParams {
    #[serde(rename = "clientId", alias = "client_id")]
    pub client_id: Option<PowerBiClientId>,
}

fn client_id(
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Option<PowerBiClientId>, AppError> {
    let Query(params) = params
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid query parameters: {}", e)))?;
    Ok(params.client_id)
}

fn viewer(auth_user: &AuthUser) -> Result<Viewer, AppError> {
    Ok(Viewer {
        user_id: auth_user.user_id()?,
        email: auth_user.email().to_string(),
        role: auth_user.role(),
        browse_all: auth_user.has_permission(permissions::REPORTS_BROWSE_ALL),
    })
}

#[utoipa::path(
    get,
    path = "/api/reports/workspaces",
    params(ClientParams),
    responses(
        (status = 200, description = "Workspaces visible to the service principal", body = Vec<Workspace>),
        (status = 404, description = "No Power BI client configured", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_workspaces(
    State(state): State<AppState>,
    _auth: RequireReportsView,
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Json<Vec<Workspace>>, AppError> {
    let client_id = client_id(params)?;
    Ok(Json(
        ReportService::list_workspaces(&state.db, &state.powerbi, client_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reports/workspaces/{workspace_id}/reports",
    params(
        ("workspace_id" = String, Path, description = "Power BI workspace (group) id"),
        ClientParams
    ),
    responses(
        (status = 200, description = "Every report in the workspace", body = Vec<Report>),
        (status = 403, description = "Missing reports:browse_all", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_reports(
    State(state): State<AppState>,
    _auth: RequireReportsBrowseAll,
    Path(workspace_id): Path<String>,
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Json<Vec<Report>>, AppError> {
    let client_id = client_id(params)?;
    Ok(Json(
        ReportService::list_reports(&state.db, &state.powerbi, &workspace_id, client_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reports/all",
    params(ClientParams),
    responses(
        (status = 200, description = "Every report in every workspace, tagged with its workspace", body = Vec<Report>),
        (status = 403, description = "Missing reports:browse_all", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_all_reports(
    State(state): State<AppState>,
    _auth: RequireReportsBrowseAll,
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Json<Vec<Report>>, AppError> {
    let client_id = client_id(params)?;
    Ok(Json(
        ReportService::list_all_reports(&state.db, &state.powerbi, client_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reports/workspaces/{workspace_id}/my-reports",
    params(
        ("workspace_id" = String, Path, description = "Power BI workspace (group) id"),
        ClientParams
    ),
    responses(
        (status = 200, description = "Reports the caller's dashboard settings list", body = Vec<Report>)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_my_reports(
    State(state): State<AppState>,
    RequireReportsView(auth_user): RequireReportsView,
    Path(workspace_id): Path<String>,
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Json<Vec<Report>>, AppError> {
    let client_id = client_id(params)?;
    let viewer = viewer(&auth_user)?;
    Ok(Json(
        ReportService::my_reports(&state.db, &state.powerbi, &viewer, &workspace_id, client_id)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reports/workspaces/{workspace_id}/reports/{report_id}/pages",
    params(
        ("workspace_id" = String, Path, description = "Power BI workspace (group) id"),
        ("report_id" = String, Path, description = "Power BI report id"),
        ClientParams
    ),
    responses(
        (status = 200, description = "Pages the caller may open, in report order", body = Vec<ReportPage>),
        (status = 403, description = "Dashboard not listed for the caller", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn list_pages(
    State(state): State<AppState>,
    RequireReportsView(auth_user): RequireReportsView,
    Path((workspace_id, report_id)): Path<(String, String)>,
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Json<Vec<ReportPage>>, AppError> {
    let client_id = client_id(params)?;
    let viewer = viewer(&auth_user)?;
    Ok(Json(
        ReportService::list_pages(
            &state.db,
            &state.powerbi,
            &viewer,
            &workspace_id,
            &report_id,
            client_id,
        )
        .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/reports/workspaces/{workspace_id}/reports/{report_id}/embed",
    params(
        ("workspace_id" = String, Path, description = "Power BI workspace (group) id"),
        ("report_id" = String, Path, description = "Power BI report id"),
        ClientParams
    ),
    responses(
        (status = 200, description = "View-only embed token and the caller's page access", body = EmbedResponse),
        (status = 403, description = "Dashboard not listed for the caller", body = ErrorResponse),
        (status = 404, description = "No Power BI client configured", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params))]
pub async fn embed_report(
    State(state): State<AppState>,
    RequireReportsView(auth_user): RequireReportsView,
    Path((workspace_id, report_id)): Path<(String, String)>,
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Json<EmbedResponse>, AppError> {
    let client_id = client_id(params)?;
    let viewer = viewer(&auth_user)?;
    Ok(Json(
        ReportService::embed(
            &state.db,
            &state.powerbi,
            &viewer,
            &workspace_id,
            &report_id,
            client_id,
        )
        .await?,
    ))
}
