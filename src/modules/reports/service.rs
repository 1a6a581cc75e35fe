use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use dashgate_core::AppError;
use dashgate_models::{
    AppRole, PageAccess, PowerBiClientId, UserId, filter_pages, is_listed_for, resolve_rls_role,
};
use dashgate_powerbi::{
    EffectiveIdentity, GenerateTokenRequest, PowerBiApi, PowerBiError, Report, ReportPage,
    Workspace,
};

use crate::metrics;
use crate::modules::dashboards::DashboardService;
use crate::modules::page_permissions::PagePermissionService;
use crate::modules::powerbi_clients::PowerBiClientService;

/// Who is asking, as far as report visibility is concerned.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: UserId,
    pub email: String,
    pub role: AppRole,
    /// Holders skip dashboard settings when browsing
    pub browse_all: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbedResponse {
    pub report_id: String,
    pub report_name: String,
    pub workspace_id: String,
    pub embed_url: String,
    pub token: String,
    pub token_id: String,
    pub expiration: String,
    /// Present when the token carries a row-level-security identity
    pub rls_role: Option<String>,
    pub page_access: PageAccess,
}

pub struct ReportService;

impl ReportService {
    async fn access_token(
        db: &PgPool,
        api: &PowerBiApi,
        client_id: Option<PowerBiClientId>,
    ) -> Result<String, AppError> {
        let credentials = PowerBiClientService::resolve_credentials(db, client_id).await?;
        api.access_token(&credentials)
            .await
            .map_err(PowerBiError::into_app_error)
    }

    #[instrument(skip(db, api))]
    pub async fn list_workspaces(
        db: &PgPool,
        api: &PowerBiApi,
        client_id: Option<PowerBiClientId>,
    ) -> Result<Vec<Workspace>, AppError> {
        let token = Self::access_token(db, api, client_id).await?;
        api.list_workspaces(&token)
            .await
            .map_err(PowerBiError::into_app_error)
    }

    #[instrument(skip(db, api))]
    pub async fn list_reports(
        db: &PgPool,
        api: &PowerBiApi,
        workspace_id: &str,
        client_id: Option<PowerBiClientId>,
    ) -> Result<Vec<Report>, AppError> {
        let token = Self::access_token(db, api, client_id).await?;
        api.list_reports(&token, workspace_id)
            .await
            .map_err(PowerBiError::into_app_error)
    }

    #[instrument(skip(db, api))]
    pub async fn list_all_reports(
        db: &PgPool,
        api: &PowerBiApi,
        client_id: Option<PowerBiClientId>,
    ) -> Result<Vec<Report>, AppError> {
        let token = Self::access_token(db, api, client_id).await?;
        api.list_all_reports(&token)
            .await
            .map_err(PowerBiError::into_app_error)
    }

    /// Reports in `workspace_id` that the viewer's dashboard settings list.
    #[instrument(skip(db, api, viewer), fields(user.id = %viewer.user_id))]
    pub async fn my_reports(
        db: &PgPool,
        api: &PowerBiApi,
        viewer: &Viewer,
        workspace_id: &str,
        client_id: Option<PowerBiClientId>,
    ) -> Result<Vec<Report>, AppError> {
        let reports = Self::list_reports(db, api, workspace_id, client_id).await?;

        let ids: Vec<String> = reports.iter().map(|r| r.id.clone()).collect();
        let settings = DashboardService::settings_for(db, &ids).await?;

        Ok(reports
            .into_iter()
            .filter(|r| is_listed_for(settings.get(&r.id), viewer.user_id, viewer.role))
            .collect())
    }

    /// Pages of a report, narrowed to what the viewer may open.
    ///
    /// `browse_all` skips the dashboard listing check only. The viewer's own
    /// page restrictions always apply.
    #[instrument(skip(db, api, viewer), fields(user.id = %viewer.user_id))]
    pub async fn list_pages(
        db: &PgPool,
        api: &PowerBiApi,
        viewer: &Viewer,
        workspace_id: &str,
        report_id: &str,
        client_id: Option<PowerBiClientId>,
    ) -> Result<Vec<ReportPage>, AppError> {
        if !viewer.browse_all {
            DashboardService::ensure_listed(db, report_id, viewer.user_id, viewer.role).await?;
        }

        let token = Self::access_token(db, api, client_id).await?;
        let pages = api
            .list_pages(&token, workspace_id, report_id)
            .await
            .map_err(PowerBiError::into_app_error)?;

        let access = PagePermissionService::allowed_pages(db, report_id, viewer.user_id).await?;
        Ok(filter_pages(&access, pages, |page| page.name.as_str()))
    }

    /// Issues a view-only embed token for one report.
    ///
    /// The RLS role comes from the viewer's own dashboard setting, then the
    /// dashboard default. An identity is only attached when there is a role
    /// and the report has a dataset.
    #[instrument(skip(db, api, viewer), fields(user.id = %viewer.user_id))]
    pub async fn embed(
        db: &PgPool,
        api: &PowerBiApi,
        viewer: &Viewer,
        workspace_id: &str,
        report_id: &str,
        client_id: Option<PowerBiClientId>,
    ) -> Result<EmbedResponse, AppError> {
        let setting = DashboardService::find_setting(db, report_id).await?;
        if !is_listed_for(setting.as_ref(), viewer.user_id, viewer.role) {
            warn!(report_id, "Embed refused: dashboard not listed for user");
            return Err(AppError::forbidden("You do not have access to this dashboard"));
        }

        let token = Self::access_token(db, api, client_id).await?;
        let report = api
            .get_report(&token, workspace_id, report_id)
            .await
            .map_err(PowerBiError::into_app_error)?;

        let user_setting = DashboardService::find_user_setting(db, report_id, viewer.user_id).await?;
        let rls_role = resolve_rls_role(user_setting.as_ref(), setting.as_ref());

        let identity = match (&rls_role, &report.dataset_id) {
            (Some(role), Some(dataset_id)) => Some(EffectiveIdentity {
                username: viewer.email.clone(),
                roles: vec![role.clone()],
                datasets: vec![dataset_id.clone()],
            }),
            _ => None,
        };
        let with_identity = identity.is_some();

        let embed_token = api
            .generate_token(
                &token,
                workspace_id,
                report_id,
                &GenerateTokenRequest::view(identity),
            )
            .await
            .map_err(PowerBiError::into_app_error)?;

        let page_access = PagePermissionService::allowed_pages(db, report_id, viewer.user_id).await?;

        metrics::track_embed_token_issued(with_identity);
        info!(report_id, with_identity, "Embed token issued");

        Ok(EmbedResponse {
            report_id: report.id,
            report_name: report.name,
            workspace_id: workspace_id.to_string(),
            embed_url: report.embed_url,
            token: embed_token.token,
            token_id: embed_token.token_id,
            expiration: embed_token.expiration,
            rls_role: rls_role.filter(|_| with_identity),
            page_access,
        })
    }
}
