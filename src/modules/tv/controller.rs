use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use dashgate_core::AppError;
use dashgate_core::permissions;
use dashgate_models::{
    CreateTvPresentationDto, ReplaceSlidesDto, TvPresentation, TvPresentationFilterParams,
    TvPresentationId, TvPresentationWithSlides, UpdateTvPresentationDto,
};

use crate::middleware::auth::{RequireTvManage, RequireTvView};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::TvService;

#[utoipa::path(
    get,
    path = "/api/tv/presentations",
    params(TvPresentationFilterParams),
    responses(
        (status = 200, description = "Presentations; inactive ones only for tv:manage", body = Vec<TvPresentation>),
        (status = 403, description = "Missing tv:view", body = ErrorResponse)
    ),
    tag = "TV",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, filters))]
pub async fn list_presentations(
    State(state): State<AppState>,
    RequireTvView(auth_user): RequireTvView,
    filters: Result<Query<TvPresentationFilterParams>, QueryRejection>,
) -> Result<Json<Vec<TvPresentation>>, AppError> {
    let Query(filters) = filters
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid query parameters: {}", e)))?;

    let include_inactive = filters.include_inactive.unwrap_or(false)
        && auth_user.has_permission(permissions::TV_MANAGE);

    Ok(Json(TvService::list(&state.db, include_inactive).await?))
}

#[utoipa::path(
    post,
    path = "/api/tv/presentations",
    request_body = CreateTvPresentationDto,
    responses(
        (status = 201, description = "Presentation created", body = TvPresentation),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "TV",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_presentation(
    State(state): State<AppState>,
    RequireTvManage(auth_user): RequireTvManage,
    ValidatedJson(dto): ValidatedJson<CreateTvPresentationDto>,
) -> Result<(StatusCode, Json<TvPresentation>), AppError> {
    let presentation = TvService::create(&state.db, auth_user.user_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(presentation)))
}

#[utoipa::path(
    get,
    path = "/api/tv/presentations/{id}",
    params(("id" = TvPresentationId, Path, description = "Presentation ID")),
    responses(
        (status = 200, description = "Presentation with slides in playback order", body = TvPresentationWithSlides),
        (status = 404, description = "Not found, or inactive for a viewer", body = ErrorResponse)
    ),
    tag = "TV",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_presentation(
    State(state): State<AppState>,
    RequireTvView(auth_user): RequireTvView,
    Path(id): Path<TvPresentationId>,
) -> Result<Json<TvPresentationWithSlides>, AppError> {
    let include_inactive = auth_user.has_permission(permissions::TV_MANAGE);
    Ok(Json(TvService::get(&state.db, id, include_inactive).await?))
}

#[utoipa::path(
    patch,
    path = "/api/tv/presentations/{id}",
    params(("id" = TvPresentationId, Path, description = "Presentation ID")),
    request_body = UpdateTvPresentationDto,
    responses(
        (status = 200, description = "Presentation updated", body = TvPresentation),
        (status = 404, description = "Presentation not found", body = ErrorResponse)
    ),
    tag = "TV",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_presentation(
    State(state): State<AppState>,
    _auth: RequireTvManage,
    Path(id): Path<TvPresentationId>,
    ValidatedJson(dto): ValidatedJson<UpdateTvPresentationDto>,
) -> Result<Json<TvPresentation>, AppError> {
    Ok(Json(TvService::update(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tv/presentations/{id}",
    params(("id" = TvPresentationId, Path, description = "Presentation ID")),
    responses(
        (status = 204, description = "Presentation and its slides deleted"),
        (status = 404, description = "Presentation not found", body = ErrorResponse)
    ),
    tag = "TV",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_presentation(
    State(state): State<AppState>,
    _auth: RequireTvManage,
    Path(id): Path<TvPresentationId>,
) -> Result<StatusCode, AppError> {
    TvService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/tv/presentations/{id}/slides",
    params(("id" = TvPresentationId, Path, description = "Presentation ID")),
    request_body = ReplaceSlidesDto,
    responses(
        (status = 200, description = "Slides replaced", body = TvPresentationWithSlides),
        (status = 404, description = "Presentation not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "TV",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn replace_slides(
    State(state): State<AppState>,
    _auth: RequireTvManage,
    Path(id): Path<TvPresentationId>,
    ValidatedJson(dto): ValidatedJson<ReplaceSlidesDto>,
) -> Result<Json<TvPresentationWithSlides>, AppError> {
    Ok(Json(TvService::replace_slides(&state.db, id, dto).await?))
}
