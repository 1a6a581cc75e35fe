use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use dashgate_core::AppError;
use dashgate_models::{
    ChangePasswordDto, CreateUserDto, MessageResponse, PaginatedUsersResponse, SetRoleDto,
    UpdateProfileDto, UpdateUserDto, User, UserFilterParams, UserId, UserOrganization,
};

use crate::middleware::auth::{
    AuthUser, RequireOrganizationsRead, RequireUsersManage, RequireUsersRead,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::organizations::OrganizationService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::UserService;

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Paginated list of users", body = PaginatedUsersResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing users:read", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, filters))]
pub async fn get_users(
    State(state): State<AppState>,
    _auth: RequireUsersRead,
    filters: Result<Query<UserFilterParams>, QueryRejection>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let Query(filters) = filters
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid query parameters: {}", e)))?;

    let users = UserService::list_users(&state.db, filters).await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Email already exists", body = ErrorResponse),
        (status = 403, description = "Missing users:manage", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    _auth: RequireUsersManage,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: RequireUsersRead,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::get_user(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    _auth: RequireUsersManage,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::update_user(&state.db, id, dto).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    params(("id" = UserId, Path, description = "User ID")),
    request_body = SetRoleDto,
    responses(
        (status = 200, description = "Role changed", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn set_user_role(
    State(state): State<AppState>,
    _auth: RequireUsersManage,
    Path(id): Path<UserId>,
    Json(dto): Json<SetRoleDto>,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::set_role(&state.db, id, dto.role).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireUsersManage(auth_user): RequireUsersManage,
    Path(id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    UserService::delete_user(&state.db, id, auth_user.user_id()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/organizations",
    params(("id" = UserId, Path, description = "User ID")),
    responses(
        (status = 200, description = "Organizations the user belongs to", body = Vec<UserOrganization>)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user_organizations(
    State(state): State<AppState>,
    _auth: RequireOrganizationsRead,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<UserOrganization>>, AppError> {
    Ok(Json(
        OrganizationService::user_organizations(&state.db, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::get_user(&state.db, auth_user.user_id()?).await?))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = User)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<User>, AppError> {
    let dto = UpdateUserDto {
        first_name: dto.first_name,
        last_name: dto.last_name,
        is_active: None,
    };
    Ok(Json(
        UserService::update_user(&state.db, auth_user.user_id()?, dto).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/users/me/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is incorrect", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::change_password(&state.db, auth_user.user_id()?, dto).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

#[utoipa::path(
    get,
    path = "/api/users/me/organizations",
    responses(
        (status = 200, description = "Organizations of the current user", body = Vec<UserOrganization>)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_organizations(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserOrganization>>, AppError> {
    Ok(Json(
        OrganizationService::user_organizations(&state.db, auth_user.user_id()?).await?,
    ))
}
