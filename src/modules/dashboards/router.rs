use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    delete_setting, get_setting, get_user_setting, list_settings, upsert_setting,
    upsert_user_setting,
};

pub fn init_dashboards_router() -> Router<AppState> {
    Router::new()
        .route("/settings", put(upsert_setting).get(list_settings))
        .route(
            "/{dashboard_id}/settings",
            get(get_setting).delete(delete_setting),
        )
        .route(
            "/{dashboard_id}/users/{user_id}/settings",
            get(get_user_setting).put(upsert_user_setting),
        )
}
