use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{
    add_member, create_organization, delete_organization, get_organization, list_members,
    list_organizations, remove_member, update_organization,
};

pub fn init_organizations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route(
            "/{id}",
            get(get_organization)
                .patch(update_organization)
                .delete(delete_organization),
        )
        .route("/{id}/members", get(list_members).post(add_member))
        .route("/{id}/members/{user_id}", delete(remove_member))
}
