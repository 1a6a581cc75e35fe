//! A local stand-in for Entra ID and the Power BI API.
//!
//! Tenants with special names trigger failure modes:
//! `rejected-tenant` answers 401, `garbage-tenant` answers non-JSON and
//! `empty-tenant` answers JSON without an `access_token`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use dashgate_config::PowerBiConfig;

use crate::models::PowerBiCredentials;

pub const MOCK_TOKEN_PREFIX: &str = "mock-access-token-";

#[derive(Clone, Default)]
struct MockState {
    token_requests: Arc<AtomicUsize>,
    generate_bodies: Arc<Mutex<Vec<Value>>>,
}

pub struct MockPowerBi {
    pub base_url: String,
    state: MockState,
}

impl MockPowerBi {
    /// Binds an ephemeral port and serves the mock in the background.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/{tenant}/oauth2/v2.0/token", post(token))
            .route("/v1.0/myorg/groups", get(workspaces))
            .route("/v1.0/myorg/groups/{ws}/reports", get(reports))
            .route("/v1.0/myorg/groups/{ws}/reports/{report}", get(report))
            .route("/v1.0/myorg/groups/{ws}/reports/{report}/pages", get(pages))
            .route(
                "/v1.0/myorg/groups/{ws}/reports/{report}/GenerateToken",
                post(generate_token),
            )
            .route("/v1.0/myorg/not-json", get(not_json).post(not_json))
            .route("/v1.0/myorg/echo", post(echo))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock Power BI listener");
        let addr = listener.local_addr().expect("mock listener address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> PowerBiConfig {
        PowerBiConfig::with_base_url(&self.base_url)
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    /// Bodies received by `GenerateToken`, oldest first.
    pub async fn generate_token_bodies(&self) -> Vec<Value> {
        self.state.generate_bodies.lock().await.clone()
    }

    pub fn credentials(cache_key: &str, tenant_id: &str) -> PowerBiCredentials {
        PowerBiCredentials {
            cache_key: cache_key.to_string(),
            tenant_id: tenant_id.to_string(),
            client_id: "mock-client".to_string(),
            client_secret: "mock-secret".to_string(),
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(&format!("Bearer {}", MOCK_TOKEN_PREFIX)))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"code": "TokenExpired"}})),
    )
        .into_response()
}

async fn token(State(state): State<MockState>, Path(tenant): Path<String>) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    match tenant.as_str() {
        "rejected-tenant" => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_client"})),
        )
            .into_response(),
        "garbage-tenant" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        "empty-tenant" => Json(json!({"token_type": "Bearer"})).into_response(),
        _ => Json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": format!("{}{}", MOCK_TOKEN_PREFIX, n),
        }))
        .into_response(),
    }
}

async fn workspaces(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "value": [
            {"id": "ws-finance", "name": "Finance", "isReadOnly": false, "isOnDedicatedCapacity": false},
            {"id": "ws-ops", "name": "Operations", "isReadOnly": true, "isOnDedicatedCapacity": false}
        ]
    }))
    .into_response()
}

fn report_json(ws: &str, report: &str) -> Value {
    json!({
        "id": report,
        "name": format!("Report {}", report),
        "embedUrl": format!("https://app.powerbi.com/reportEmbed?reportId={}&groupId={}", report, ws),
        "webUrl": format!("https://app.powerbi.com/groups/{}/reports/{}", ws, report),
        "datasetId": format!("{}-dataset", report)
    })
}

async fn reports(headers: HeaderMap, Path(ws): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if ws == "ws-empty" {
        return Json(json!({})).into_response();
    }
    let ids = [format!("{}-r1", ws), format!("{}-r2", ws)];
    Json(json!({ "value": ids.iter().map(|id| report_json(&ws, id)).collect::<Vec<_>>() }))
        .into_response()
}

async fn report(headers: HeaderMap, Path((ws, report)): Path<(String, String)>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if report == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": "ItemNotFound"}})),
        )
            .into_response();
    }
    Json(report_json(&ws, &report)).into_response()
}

async fn pages(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "value": [
            {"name": "ReportSection3", "displayName": "Details", "order": 2},
            {"name": "ReportSection1", "displayName": "Overview", "order": 0},
            {"name": "ReportSection2", "displayName": "Regions", "order": 1}
        ]
    }))
    .into_response()
}

async fn generate_token(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.generate_bodies.lock().await.push(body);
    Json(json!({
        "token": "mock-embed-token",
        "tokenId": "mock-token-id",
        "expiration": "2030-01-01T00:00:00Z"
    }))
    .into_response()
}

async fn not_json() -> Response {
    (StatusCode::ACCEPTED, "plain text").into_response()
}

async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::CREATED, Json(json!({ "received": body }))).into_response()
}
