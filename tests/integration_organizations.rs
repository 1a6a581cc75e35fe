mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use common::{body_json, create_test_user, request, send, setup_test_app};
use dashgate::dashgate_models::AppRole;

async fn create_org(app: &axum::Router, token: &str, name: &str) -> Value {
    let response = send(
        app,
        request(
            "POST",
            "/api/organizations",
            Some(token),
            Some(json!({"name": name, "primary_color": "#1a2b3c"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_organization_makes_creator_admin_member(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let org = create_org(&app, &master.token, "Acme").await;
    assert_eq!(org["name"], "Acme");
    assert_eq!(org["owner_id"], master.id.to_string());

    let response = send(
        &app,
        request(
            "GET",
            &format!("/api/organizations/{}/members", org["id"].as_str().unwrap()),
            Some(&master.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let members = body_json(response).await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user_id"], master.id.to_string());
    assert_eq!(members[0]["role"], "admin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_color_is_rejected(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(
        &app,
        request(
            "POST",
            "/api/organizations",
            Some(&master.token),
            Some(json!({"name": "Acme", "primary_color": "red"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_reads_but_cannot_manage(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let admin = create_test_user(&pool, AppRole::Admin).await;
    let app = setup_test_app(pool.clone()).await;
    create_org(&app, &master.token, "Acme").await;

    let response = send(&app, request("GET", "/api/organizations", Some(&admin.token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        request(
            "POST",
            "/api/organizations",
            Some(&admin.token),
            Some(json!({"name": "Other"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_plain_user_cannot_list_organizations(pool: PgPool) {
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(&app, request("GET", "/api/organizations", Some(&user.token), None)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_keeps_unset_fields(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;
    let org = create_org(&app, &master.token, "Acme").await;

    let response = send(
        &app,
        request(
            "PATCH",
            &format!("/api/organizations/{}", org["id"].as_str().unwrap()),
            Some(&master.token),
            Some(json!({"name": "Acme Corp"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Acme Corp");
    assert_eq!(body["primary_color"], "#1a2b3c");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_member_lifecycle(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;
    let org = create_org(&app, &master.token, "Acme").await;
    let members_uri = format!("/api/organizations/{}/members", org["id"].as_str().unwrap());

    let add = json!({"user_id": user.id});
    let response = send(&app, request("POST", &members_uri, Some(&master.token), Some(add.clone()))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["role"], "member");

    let response = send(&app, request("POST", &members_uri, Some(&master.token), Some(add))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        request("GET", "/api/users/me/organizations", Some(&user.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let orgs = body_json(response).await;
    assert_eq!(orgs.as_array().unwrap().len(), 1);
    assert_eq!(orgs[0]["name"], "Acme");

    let member_uri = format!("{}/{}", members_uri, user.id);
    let response = send(&app, request("DELETE", &member_uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request("DELETE", &member_uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_unknown_user_is_not_found(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;
    let org = create_org(&app, &master.token, "Acme").await;

    let response = send(
        &app,
        request(
            "POST",
            &format!("/api/organizations/{}/members", org["id"].as_str().unwrap()),
            Some(&master.token),
            Some(json!({"user_id": uuid::Uuid::new_v4()})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_organization(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;
    let org = create_org(&app, &master.token, "Acme").await;
    let uri = format!("/api/organizations/{}", org["id"].as_str().unwrap());

    let response = send(&app, request("DELETE", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request("GET", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
