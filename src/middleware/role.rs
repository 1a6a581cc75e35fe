//! Role gates applied as router layers.
//!
//! Permission extractors cover individual handlers; these guard whole
//! subtrees that only certain roles may ever reach.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use dashgate_core::AppError;
use dashgate_models::AppRole;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Runs `next` only when the caller's role is in `allowed_roles`.
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed_roles: &[AppRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;
    let role = auth_user.role();

    if !allowed_roles.contains(&role) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}, but user has role: {}",
            allowed_roles
                .iter()
                .map(AppRole::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            role
        )));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Layer for `admin_master`-only routes.
///
/// ```rust,ignore
/// Router::new()
///     .nest("/powerbi-clients", init_powerbi_clients_router())
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin_master));
/// ```
pub async fn require_admin_master(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(&state, req, next, &[AppRole::AdminMaster]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Layer for routes open to `admin_master` and `admin`.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(&state, req, next, &[AppRole::AdminMaster, AppRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
