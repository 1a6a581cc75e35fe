use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use dashgate_core::AppError;
use dashgate_models::{
    CreatePowerBiClientDto, PowerBiClientId, PowerBiClientResponse, UpdatePowerBiClientDto,
};

use crate::middleware::auth::RequireClientsManage;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::PowerBiClientService;

#[utoipa::path(
    get,
    path = "/api/powerbi-clients",
    responses(
        (status = 200, description = "Stored Power BI clients, secrets omitted", body = Vec<PowerBiClientResponse>),
        (status = 403, description = "admin_master only", body = ErrorResponse)
    ),
    tag = "Power BI Clients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_clients(
    State(state): State<AppState>,
    _auth: RequireClientsManage,
) -> Result<Json<Vec<PowerBiClientResponse>>, AppError> {
    let clients = PowerBiClientService::list(&state.db).await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/powerbi-clients",
    request_body = CreatePowerBiClientDto,
    responses(
        (status = 201, description = "Client stored", body = PowerBiClientResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Power BI Clients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_client(
    State(state): State<AppState>,
    _auth: RequireClientsManage,
    ValidatedJson(dto): ValidatedJson<CreatePowerBiClientDto>,
) -> Result<(StatusCode, Json<PowerBiClientResponse>), AppError> {
    let client = PowerBiClientService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

#[utoipa::path(
    get,
    path = "/api/powerbi-clients/{id}",
    params(("id" = PowerBiClientId, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client, secrets omitted", body = PowerBiClientResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    tag = "Power BI Clients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_client(
    State(state): State<AppState>,
    _auth: RequireClientsManage,
    Path(id): Path<PowerBiClientId>,
) -> Result<Json<PowerBiClientResponse>, AppError> {
    Ok(Json(PowerBiClientService::get(&state.db, id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/powerbi-clients/{id}",
    params(("id" = PowerBiClientId, Path, description = "Client ID")),
    request_body = UpdatePowerBiClientDto,
    responses(
        (status = 200, description = "Client updated", body = PowerBiClientResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    tag = "Power BI Clients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_client(
    State(state): State<AppState>,
    _auth: RequireClientsManage,
    Path(id): Path<PowerBiClientId>,
    ValidatedJson(dto): ValidatedJson<UpdatePowerBiClientDto>,
) -> Result<Json<PowerBiClientResponse>, AppError> {
    let client =
        PowerBiClientService::update(&state.db, state.powerbi.cache(), id, dto).await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    delete,
    path = "/api/powerbi-clients/{id}",
    params(("id" = PowerBiClientId, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    tag = "Power BI Clients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_client(
    State(state): State<AppState>,
    _auth: RequireClientsManage,
    Path(id): Path<PowerBiClientId>,
) -> Result<StatusCode, AppError> {
    PowerBiClientService::delete(&state.db, state.powerbi.cache(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
