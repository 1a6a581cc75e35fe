use axum::{Router, routing::any};

use crate::state::AppState;

use super::controller::proxy;

pub fn init_proxy_router() -> Router<AppState> {
    Router::new().route("/", any(proxy))
}
