use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    change_password, create_user, delete_user, get_me, get_my_organizations, get_user,
    get_user_organizations, get_users, set_user_role, update_me, update_user,
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/me", get(get_me).patch(update_me))
        .route("/me/password", post(change_password))
        .route("/me/organizations", get(get_my_organizations))
        .route("/{id}", get(get_user).patch(update_user).delete(delete_user))
        .route("/{id}/role", put(set_user_role))
        .route("/{id}/organizations", get(get_user_organizations))
}
