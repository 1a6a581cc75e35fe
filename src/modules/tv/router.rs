use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    create_presentation, delete_presentation, get_presentation, list_presentations,
    replace_slides, update_presentation,
};

pub fn init_tv_router() -> Router<AppState> {
    Router::new()
        .route(
            "/presentations",
            get(list_presentations).post(create_presentation),
        )
        .route(
            "/presentations/{id}",
            get(get_presentation)
                .patch(update_presentation)
                .delete(delete_presentation),
        )
        .route("/presentations/{id}/slides", put(replace_slides))
}
