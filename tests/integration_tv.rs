mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use common::{body_json, create_test_user, request, send, setup_test_app};
use dashgate::dashgate_models::AppRole;

async fn create_presentation(app: &axum::Router, token: &str, body: Value) -> Value {
    let response = send(app, request("POST", "/api/tv/presentations", Some(token), Some(body))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_presentation(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let body = create_presentation(&app, &master.token, json!({"name": "Lobby"})).await;

    assert_eq!(body["name"], "Lobby");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["created_by"], master.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_sees_only_active_presentations(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let admin = create_test_user(&pool, AppRole::Admin).await;
    let app = setup_test_app(pool.clone()).await;
    create_presentation(&app, &master.token, json!({"name": "Lobby"})).await;
    let hidden = create_presentation(&app, &master.token, json!({"name": "Draft", "is_active": false})).await;

    let response = send(
        &app,
        request("GET", "/api/tv/presentations?include_inactive=true", Some(&admin.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Lobby");

    let response = send(
        &app,
        request("GET", "/api/tv/presentations?include_inactive=true", Some(&master.token), None),
    )
    .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let uri = format!("/api/tv/presentations/{}", hidden["id"].as_str().unwrap());
    let response = send(&app, request("GET", &uri, Some(&admin.token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, request("GET", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_slides_orders_and_defaults_duration(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;
    let presentation = create_presentation(&app, &master.token, json!({"name": "Lobby"})).await;
    let uri = format!(
        "/api/tv/presentations/{}/slides",
        presentation["id"].as_str().unwrap()
    );

    let response = send(
        &app,
        request(
            "PUT",
            &uri,
            Some(&master.token),
            Some(json!({"slides": [
                {"workspace_id": "ws-finance", "report_id": "ws-finance-r1", "page_name": "ReportSection1", "duration": 60},
                {"workspace_id": "ws-ops", "report_id": "ws-ops-r2"}
            ]})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let slides = body["slides"].as_array().unwrap();
    assert_eq!(slides.len(), 2);
    assert_eq!(slides[0]["order_index"], 0);
    assert_eq!(slides[0]["duration"], 60);
    assert_eq!(slides[1]["order_index"], 1);
    assert_eq!(slides[1]["duration"], 30);
    assert_eq!(slides[1]["report_id"], "ws-ops-r2");

    let response = send(
        &app,
        request("PUT", &uri, Some(&master.token), Some(json!({"slides": []}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["slides"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_slides_rejects_zero_duration(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;
    let presentation = create_presentation(&app, &master.token, json!({"name": "Lobby"})).await;

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/tv/presentations/{}/slides", presentation["id"].as_str().unwrap()),
            Some(&master.token),
            Some(json!({"slides": [{"workspace_id": "ws", "report_id": "r", "duration": 0}]})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_slides_for_missing_presentation(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/tv/presentations/{}/slides", uuid::Uuid::new_v4()),
            Some(&master.token),
            Some(json!({"slides": []})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_and_delete_presentation(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;
    let presentation = create_presentation(&app, &master.token, json!({"name": "Lobby"})).await;
    let uri = format!("/api/tv/presentations/{}", presentation["id"].as_str().unwrap());

    let response = send(
        &app,
        request("PATCH", &uri, Some(&master.token), Some(json!({"is_active": false}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_active"], false);
    assert_eq!(body["name"], "Lobby");

    let response = send(&app, request("DELETE", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request("DELETE", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tv_permissions(pool: PgPool) {
    let admin = create_test_user(&pool, AppRole::Admin).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(&app, request("GET", "/api/tv/presentations", Some(&user.token), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        request("POST", "/api/tv/presentations", Some(&admin.token), Some(json!({"name": "X"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
