use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use dashgate_core::AppError;
use dashgate_models::{
    AddMemberDto, CreateOrganizationDto, Organization, OrganizationId, OrganizationMember,
    OrganizationMemberWithProfile, UpdateOrganizationDto, UserId,
};

use crate::middleware::auth::{RequireOrganizationsManage, RequireOrganizationsRead};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::OrganizationService;

#[utoipa::path(
    get,
    path = "/api/organizations",
    responses(
        (status = 200, description = "All organizations", body = Vec<Organization>),
        (status = 403, description = "Missing organizations:read", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_organizations(
    State(state): State<AppState>,
    _auth: RequireOrganizationsRead,
) -> Result<Json<Vec<Organization>>, AppError> {
    Ok(Json(OrganizationService::list(&state.db).await?))
}

#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationDto,
    responses(
        (status = 201, description = "Organization created; the caller becomes its admin", body = Organization),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_organization(
    State(state): State<AppState>,
    RequireOrganizationsManage(auth_user): RequireOrganizationsManage,
    ValidatedJson(dto): ValidatedJson<CreateOrganizationDto>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    let organization = OrganizationService::create(&state.db, auth_user.user_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    params(("id" = OrganizationId, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization", body = Organization),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_organization(
    State(state): State<AppState>,
    _auth: RequireOrganizationsRead,
    Path(id): Path<OrganizationId>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(OrganizationService::get(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/organizations/{id}",
    params(("id" = OrganizationId, Path, description = "Organization ID")),
    request_body = UpdateOrganizationDto,
    responses(
        (status = 200, description = "Organization updated", body = Organization),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_organization(
    State(state): State<AppState>,
    _auth: RequireOrganizationsManage,
    Path(id): Path<OrganizationId>,
    ValidatedJson(dto): ValidatedJson<UpdateOrganizationDto>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(OrganizationService::update(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    params(("id" = OrganizationId, Path, description = "Organization ID")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_organization(
    State(state): State<AppState>,
    _auth: RequireOrganizationsManage,
    Path(id): Path<OrganizationId>,
) -> Result<StatusCode, AppError> {
    OrganizationService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}/members",
    params(("id" = OrganizationId, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Members with profile details", body = Vec<OrganizationMemberWithProfile>),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
    _auth: RequireOrganizationsRead,
    Path(id): Path<OrganizationId>,
) -> Result<Json<Vec<OrganizationMemberWithProfile>>, AppError> {
    Ok(Json(OrganizationService::list_members(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/members",
    params(("id" = OrganizationId, Path, description = "Organization ID")),
    request_body = AddMemberDto,
    responses(
        (status = 201, description = "Member added", body = OrganizationMember),
        (status = 400, description = "Already a member", body = ErrorResponse),
        (status = 404, description = "Organization or user not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_member(
    State(state): State<AppState>,
    _auth: RequireOrganizationsManage,
    Path(id): Path<OrganizationId>,
    Json(dto): Json<AddMemberDto>,
) -> Result<(StatusCode, Json<OrganizationMember>), AppError> {
    let member = OrganizationService::add_member(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/members/{user_id}",
    params(
        ("id" = OrganizationId, Path, description = "Organization ID"),
        ("user_id" = UserId, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_member(
    State(state): State<AppState>,
    _auth: RequireOrganizationsManage,
    Path((id, user_id)): Path<(OrganizationId, UserId)>,
) -> Result<StatusCode, AppError> {
    OrganizationService::remove_member(&state.db, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
