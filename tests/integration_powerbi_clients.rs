mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use common::{body_json, create_test_user, request, send, setup_test_app};
use dashgate::dashgate_models::AppRole;

fn client_payload() -> Value {
    json!({
        "name": "Contoso",
        "tenant_id": "tenant-1",
        "client_id": "app-1",
        "client_secret": "super-secret",
        "email": "svc@contoso.com",
        "password": "svc-password"
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_client_never_returns_secrets(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(
        &app,
        request("POST", "/api/powerbi-clients", Some(&master.token), Some(client_payload())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Contoso");
    assert_eq!(body["has_client_secret"], true);
    assert_eq!(body["has_password"], true);
    assert!(body.get("client_secret").is_none());
    assert!(body.get("password").is_none());
    assert!(!body.to_string().contains("super-secret"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_secret_is_rejected(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let mut payload = client_payload();
    payload["client_secret"] = json!("");
    let response = send(
        &app,
        request("POST", "/api/powerbi-clients", Some(&master.token), Some(payload)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_without_secret_keeps_it(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let created = body_json(
        send(
            &app,
            request("POST", "/api/powerbi-clients", Some(&master.token), Some(client_payload())),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        request(
            "PATCH",
            &format!("/api/powerbi-clients/{}", id),
            Some(&master.token),
            Some(json!({"name": "Contoso BI"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Contoso BI");
    assert_eq!(body["has_client_secret"], true);

    let secret: String =
        sqlx::query_scalar("SELECT client_secret FROM powerbi_clients WHERE id = $1::uuid")
            .bind(&id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(secret, "super-secret");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_and_delete_clients(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let created = body_json(
        send(
            &app,
            request("POST", "/api/powerbi-clients", Some(&master.token), Some(client_payload())),
        )
        .await,
    )
    .await;

    let response = send(&app, request("GET", "/api/powerbi-clients", Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let uri = format!("/api/powerbi-clients/{}", created["id"].as_str().unwrap());
    let response = send(&app, request("DELETE", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request("GET", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_clients_are_admin_master_only(pool: PgPool) {
    let admin = create_test_user(&pool, AppRole::Admin).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    for token in [&admin.token, &user.token] {
        let response = send(&app, request("GET", "/api/powerbi-clients", Some(token), None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response = send(&app, request("GET", "/api/powerbi-clients", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
