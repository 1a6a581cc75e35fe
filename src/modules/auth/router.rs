use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_session, login_user, refresh_token};

/// Login and refresh. Mounted behind the stricter auth rate limit.
pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_user))
        .route("/refresh", post(refresh_token))
}

/// Session introspection, outside the auth rate limit.
pub fn init_session_router() -> Router<AppState> {
    Router::new().route("/me", get(get_session))
}
