use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use tracing::{info, instrument};

use dashgate_core::AppError;
use dashgate_models::PowerBiClientId;
use dashgate_powerbi::{PowerBiApi, PowerBiError, UpstreamResponse};

use crate::modules::powerbi_clients::PowerBiClientService;

/// Pseudo-path that returns the access token instead of calling the API.
pub const GET_ACCESS_TOKEN_PATH: &str = "get-access-token";

pub struct ProxyService;

impl ProxyService {
    /// Forwards one call to the Power BI API with the resolved client's token.
    ///
    /// Upstream statuses, including errors, are passed through untouched.
    #[instrument(skip(db, api, body))]
    pub async fn forward(
        db: &PgPool,
        api: &PowerBiApi,
        client_id: Option<PowerBiClientId>,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<UpstreamResponse, AppError> {
        let credentials = PowerBiClientService::resolve_credentials(db, client_id).await?;
        let token = api
            .access_token(&credentials)
            .await
            .map_err(PowerBiError::into_app_error)?;

        if path == GET_ACCESS_TOKEN_PATH {
            return Ok(UpstreamResponse {
                status: StatusCode::OK,
                body: json!({ "access_token": token }),
            });
        }

        let response = api
            .request(&token, method.clone(), path, body.as_ref())
            .await
            .map_err(PowerBiError::into_app_error)?;

        info!(%method, path, status = response.status.as_u16(), "Proxied Power BI call");
        Ok(response)
    }
}
