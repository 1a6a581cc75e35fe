use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{Method, StatusCode},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use utoipa::IntoParams;

use dashgate_core::AppError;
use dashgate_models::PowerBiClientId;

use crate::middleware::auth::RequirePowerBiProxy;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

use super::service::ProxyService;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProxyParams {
    /// Power BI API path such as `v1.0/myorg/groups`, or `get-access-token`
    pub path: Option<String>,
    #[serde(rename = "clientId", alias = "client_id")]
    pub client_id: Option<PowerBiClientId>,
}

#[utoipa::path(
    post,
    path = "/api/powerbi",
    params(ProxyParams),
    request_body(
        content = Object,
        content_type = "application/json",
        description = "Forwarded as the upstream JSON body; ignored for GET"
    ),
    responses(
        (status = 200, description = "Upstream JSON, with the upstream status"),
        (status = 400, description = "Missing path", body = ErrorResponse),
        (status = 403, description = "Only admin_master may use the proxy", body = ErrorResponse),
        (status = 404, description = "No Power BI client configured", body = ErrorResponse),
        (status = 500, description = "Client credentials are incomplete", body = ErrorResponse),
        (status = 502, description = "Token request rejected by Entra ID", body = ErrorResponse)
    ),
    tag = "Power BI Proxy",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, params, body))]
pub async fn proxy(
    State(state): State<AppState>,
    _auth: RequirePowerBiProxy,
    method: Method,
    params: Result<Query<ProxyParams>, QueryRejection>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Query(params) = params
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid query parameters: {}", e)))?;

    let path = params
        .path
        .map(|p| p.trim().trim_start_matches('/').to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Missing 'path' query parameter")))?;

    let body = if method == Method::GET || body.is_empty() {
        None
    } else {
        Some(
            serde_json::from_slice::<Value>(&body)
                .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid JSON body: {}", e)))?,
        )
    };

    let response = ProxyService::forward(
        &state.db,
        &state.powerbi,
        params.client_id,
        method,
        &path,
        body,
    )
    .await?;

    Ok((response.status, Json(response.body)))
}
