use axum::Json;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;

use super::service::{NavigationMenu, NavigationService};

#[utoipa::path(
    get,
    path = "/api/navigation",
    responses(
        (status = 200, description = "Menu entries for the caller's role", body = NavigationMenu),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Navigation",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth_user))]
pub async fn get_navigation(auth_user: AuthUser) -> Json<NavigationMenu> {
    Json(NavigationService::menu_for(auth_user.role()))
}
