#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::OnceLock;

use axum::{Extension, Router};
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use dashgate::dashgate_auth::create_access_token;
use dashgate::dashgate_config::{CorsConfig, JwtConfig, PowerBiConfig, RateLimitConfig};
use dashgate::dashgate_core::hash_password;
use dashgate::dashgate_models::{AppRole, PowerBiClientId, UserId};
use dashgate::dashgate_powerbi::PowerBiApi;
use dashgate::router::init_router;
use dashgate::state::AppState;

pub const TEST_PASSWORD: &str = "password123";

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub role: AppRole,
    pub token: String,
}

/// Limits high enough that no functional test trips the governor.
pub fn relaxed_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        general_per_second: 1,
        general_burst_size: 10_000,
        auth_per_second: 1,
        auth_burst_size: 10_000,
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "dashgate-test-secret".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604_800,
    }
}

pub fn test_state(
    pool: PgPool,
    powerbi: PowerBiConfig,
    rate_limit_config: RateLimitConfig,
) -> AppState {
    AppState {
        db: pool,
        jwt_config: jwt_config(),
        cors_config: CorsConfig::from_list("http://localhost:5173"),
        rate_limit_config,
        powerbi: PowerBiApi::new(powerbi).unwrap(),
    }
}

pub const TEST_CLIENT_IP: &str = "127.0.0.1";

/// The router as served. Requests without forwarding headers are keyed on a
/// fixed peer address by the rate limiter.
pub fn app_from_state(state: AppState) -> Router {
    init_router(state).layer(Extension(ConnectInfo(SocketAddr::from((
        [127, 0, 0, 1],
        40_000,
    )))))
}

pub async fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    app_from_state(test_state(
        pool,
        PowerBiConfig::default(),
        relaxed_rate_limit_config(),
    ))
}

/// App wired to a Power BI mock at `base_url`.
pub async fn setup_test_app_with_powerbi(pool: PgPool, base_url: &str) -> Router {
    app_from_state(test_state(
        pool,
        PowerBiConfig::with_base_url(base_url),
        relaxed_rate_limit_config(),
    ))
}

fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).unwrap())
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Inserts a user with profile and role and mints an access token for it.
pub async fn create_test_user(pool: &PgPool, role: AppRole) -> TestUser {
    create_test_user_with(pool, &generate_unique_email(), role, true).await
}

pub async fn create_test_user_with(
    pool: &PgPool,
    email: &str,
    role: AppRole,
    is_active: bool,
) -> TestUser {
    let mut tx = pool.begin().await.unwrap();

    let id: UserId = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(email)
    .bind(password_hash())
    .fetch_one(&mut *tx)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO profiles (id, first_name, last_name, is_active) VALUES ($1, 'Test', 'User', $2)",
    )
    .bind(id)
    .bind(is_active)
    .execute(&mut *tx)
    .await
    .unwrap();

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
        .bind(id)
        .bind(role)
        .execute(&mut *tx)
        .await
        .unwrap();

    tx.commit().await.unwrap();

    let token = create_access_token(id.into_inner(), email, role.as_str(), &jwt_config()).unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        role,
        token,
    }
}

/// Stores a Power BI client pointing at `tenant_id`.
pub async fn create_powerbi_client(pool: &PgPool, name: &str, tenant_id: &str) -> PowerBiClientId {
    sqlx::query_scalar(
        "INSERT INTO powerbi_clients (name, tenant_id, client_id, client_secret)
         VALUES ($1, $2, 'mock-client', 'mock-secret')
         RETURNING id",
    )
    .bind(name)
    .bind(tenant_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_dashboard_setting(
    pool: &PgPool,
    dashboard_id: &str,
    is_visible: bool,
    assigned_users: &[UserId],
    rls_role: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO powerbi_dashboard_settings (dashboard_id, is_visible, assigned_users, rls_role)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(dashboard_id)
    .bind(is_visible)
    .bind(assigned_users)
    .bind(rls_role)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn restrict_pages(pool: &PgPool, dashboard_id: &str, user_id: UserId, pages: &[&str]) {
    for page in pages {
        sqlx::query(
            "INSERT INTO powerbi_dashboard_page_permissions (dashboard_id, page_name, user_id)
             VALUES ($1, $2, $3)",
        )
        .bind(dashboard_id)
        .bind(*page)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", TEST_CLIENT_IP);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
