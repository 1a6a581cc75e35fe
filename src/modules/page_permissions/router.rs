use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    check_navigation, clear_user_page_permissions, get_allowed_pages, list_page_permissions,
    replace_page_users,
};

/// Nested under `/api/dashboards`, next to the dashboard settings routes.
pub fn init_page_permissions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{dashboard_id}/page-permissions",
            get(list_page_permissions).put(replace_page_users),
        )
        .route(
            "/{dashboard_id}/page-permissions/users/{user_id}",
            delete(clear_user_page_permissions),
        )
        .route("/{dashboard_id}/pages/allowed", get(get_allowed_pages))
        .route("/{dashboard_id}/pages/check", post(check_navigation))
}
