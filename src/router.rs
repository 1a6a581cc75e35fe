use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use dashgate_core::AppError;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::role::{require_admin, require_admin_master};
use crate::modules::auth::init_auth_router;
use crate::modules::auth::router::init_session_router;
use crate::modules::dashboards::init_dashboards_router;
use crate::modules::navigation::init_navigation_router;
use crate::modules::organizations::init_organizations_router;
use crate::modules::page_permissions::init_page_permissions_router;
use crate::modules::powerbi_clients::init_powerbi_clients_router;
use crate::modules::proxy::init_proxy_router;
use crate::modules::reports::init_reports_router;
use crate::modules::tv::init_tv_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;

/// Liveness plus a database round trip.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are reachable"),
        (status = 500, description = "Database unreachable")
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Builds the application router.
///
/// Does not install the Prometheus recorder; `main` does that once and merges
/// [`crate::metrics::metrics_app`] next to this router.
pub fn init_router(state: AppState) -> Router {
    let auth_governor = GovernorLayer::new(Arc::new(
        state.rate_limit_config.auth_governor_config(),
    ));
    let general_governor = GovernorLayer::new(Arc::new(
        state.rate_limit_config.general_governor_config(),
    ));

    let api = Router::new()
        .nest(
            "/auth",
            init_auth_router()
                .layer(auth_governor)
                .merge(init_session_router()),
        )
        .nest("/users", init_users_router())
        .nest("/organizations", init_organizations_router())
        .nest(
            "/powerbi-clients",
            init_powerbi_clients_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin_master,
            )),
        )
        .nest(
            "/powerbi",
            init_proxy_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin_master,
            )),
        )
        .nest(
            "/dashboards",
            init_dashboards_router().merge(init_page_permissions_router()),
        )
        .nest("/reports", init_reports_router())
        .nest("/navigation", init_navigation_router())
        .nest(
            "/tv",
            init_tv_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .layer(general_governor);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
