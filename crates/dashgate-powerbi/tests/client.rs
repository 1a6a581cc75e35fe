use std::time::Duration;

use dashgate_powerbi::testing::{MOCK_TOKEN_PREFIX, MockPowerBi};
use dashgate_powerbi::{GenerateTokenRequest, PowerBiApi, PowerBiError};
use reqwest::{Method, StatusCode};
use serde_json::json;

async fn setup() -> (MockPowerBi, PowerBiApi) {
    let mock = MockPowerBi::start().await;
    let api = PowerBiApi::new(mock.config()).unwrap();
    (mock, api)
}

#[tokio::test]
async fn test_access_token_is_cached_per_key() {
    let (mock, api) = setup().await;
    let creds = MockPowerBi::credentials("default", "tenant-a");

    let first = api.access_token(&creds).await.unwrap();
    let second = api.access_token(&creds).await.unwrap();

    assert!(first.starts_with(MOCK_TOKEN_PREFIX));
    assert_eq!(first, second);
    assert_eq!(mock.token_requests(), 1);

    let other = MockPowerBi::credentials("client-2", "tenant-b");
    let third = api.access_token(&other).await.unwrap();
    assert_ne!(first, third);
    assert_eq!(mock.token_requests(), 2);
}

#[tokio::test]
async fn test_expired_token_is_refetched() {
    let mock = MockPowerBi::start().await;
    let mut config = mock.config();
    config.token_ttl = Duration::from_millis(50);
    let api = PowerBiApi::new(config).unwrap();
    let creds = MockPowerBi::credentials("default", "tenant-a");

    api.access_token(&creds).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    api.access_token(&creds).await.unwrap();

    assert_eq!(mock.token_requests(), 2);
}

#[tokio::test]
async fn test_rejected_credentials_are_bad_gateway() {
    let (_mock, api) = setup().await;
    let creds = MockPowerBi::credentials("default", "rejected-tenant");

    let err = api.access_token(&creds).await.unwrap_err();
    match &err {
        PowerBiError::TokenRejected { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("invalid_client"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    assert!(api.cache().is_empty().await);
}

#[tokio::test]
async fn test_non_json_token_response_is_invalid() {
    let (_mock, api) = setup().await;
    let creds = MockPowerBi::credentials("default", "garbage-tenant");

    let err = api.access_token(&creds).await.unwrap_err();
    assert!(matches!(err, PowerBiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_missing_access_token_is_an_error() {
    let (_mock, api) = setup().await;
    let creds = MockPowerBi::credentials("default", "empty-tenant");

    let err = api.access_token(&creds).await.unwrap_err();
    assert!(matches!(err, PowerBiError::MissingAccessToken));
}

#[tokio::test]
async fn test_incomplete_credentials_never_reach_the_network() {
    let (mock, api) = setup().await;
    let mut creds = MockPowerBi::credentials("default", "tenant-a");
    creds.client_secret = String::new();

    let err = api.access_token(&creds).await.unwrap_err();
    assert!(matches!(err, PowerBiError::IncompleteCredentials));
    assert_eq!(mock.token_requests(), 0);
}

#[tokio::test]
async fn test_list_all_reports_tags_workspace() {
    let (_mock, api) = setup().await;
    let token = api
        .access_token(&MockPowerBi::credentials("default", "tenant-a"))
        .await
        .unwrap();

    let reports = api.list_all_reports(&token).await.unwrap();

    assert_eq!(reports.len(), 4);
    let ops = reports.iter().find(|r| r.id == "ws-ops-r2").unwrap();
    assert_eq!(ops.workspace_id.as_deref(), Some("ws-ops"));
    assert_eq!(ops.workspace_name.as_deref(), Some("Operations"));
}

#[tokio::test]
async fn test_missing_value_reads_as_empty() {
    let (_mock, api) = setup().await;
    let token = api
        .access_token(&MockPowerBi::credentials("default", "tenant-a"))
        .await
        .unwrap();

    assert!(api.list_reports(&token, "ws-empty").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pages_are_sorted_by_order() {
    let (_mock, api) = setup().await;
    let token = api
        .access_token(&MockPowerBi::credentials("default", "tenant-a"))
        .await
        .unwrap();

    let pages = api.list_pages(&token, "ws-finance", "ws-finance-r1").await.unwrap();
    let names: Vec<_> = pages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["ReportSection1", "ReportSection2", "ReportSection3"]);
}

#[tokio::test]
async fn test_generate_token_sends_body() {
    let (mock, api) = setup().await;
    let token = api
        .access_token(&MockPowerBi::credentials("default", "tenant-a"))
        .await
        .unwrap();

    let embed = api
        .generate_token(&token, "ws-finance", "ws-finance-r1", &GenerateTokenRequest::view(None))
        .await
        .unwrap();

    assert_eq!(embed.token, "mock-embed-token");
    assert_eq!(embed.token_id, "mock-token-id");
    assert_eq!(
        mock.generate_token_bodies().await,
        vec![json!({"accessLevel": "View"})]
    );
}

#[tokio::test]
async fn test_upstream_404_is_reported() {
    let (_mock, api) = setup().await;
    let token = api
        .access_token(&MockPowerBi::credentials("default", "tenant-a"))
        .await
        .unwrap();

    let err = api.get_report(&token, "ws-finance", "missing").await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_passthrough() {
    let (_mock, api) = setup().await;
    let token = api
        .access_token(&MockPowerBi::credentials("default", "tenant-a"))
        .await
        .unwrap();

    let response = api
        .request(&token, Method::POST, "v1.0/myorg/echo", Some(&json!({"a": 1})))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body, json!({"received": {"a": 1}}));

    let response = api
        .request(&token, Method::GET, "v1.0/myorg/not-json", None)
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body, json!({}));
}

#[tokio::test]
async fn test_bad_token_is_passed_through_not_raised() {
    let (_mock, api) = setup().await;

    let response = api
        .request("not-a-mock-token", Method::GET, "/v1.0/myorg/groups", None)
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
