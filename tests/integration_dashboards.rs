mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{body_json, create_test_user, request, send, setup_test_app};
use dashgate::dashgate_models::AppRole;

#[sqlx::test(migrations = "./migrations")]
async fn test_upsert_setting_dedups_assigned_users(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(
        &app,
        request(
            "PUT",
            "/api/dashboards/settings",
            Some(&master.token),
            Some(json!({
                "dashboard_id": "ws-finance-r1",
                "assigned_users": [user.id, user.id],
                "rls_role": "  "
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["dashboard_id"], "ws-finance-r1");
    assert_eq!(body["is_visible"], true);
    assert_eq!(body["assigned_users"], json!([user.id]));
    assert!(body["rls_role"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upsert_setting_replaces_previous_values(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    for body in [
        json!({"dashboard_id": "r1", "assigned_users": [user.id], "rls_role": "Region"}),
        json!({"dashboard_id": "r1", "is_visible": false}),
    ] {
        let response = send(
            &app,
            request("PUT", "/api/dashboards/settings", Some(&master.token), Some(body)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(
        &app,
        request("GET", "/api/dashboards/r1/settings", Some(&master.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_visible"], false);
    assert_eq!(body["assigned_users"], json!([]));
    assert!(body["rls_role"].is_null());

    let response = send(&app, request("GET", "/api/dashboards/settings", Some(&master.token), None)).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_assigned_user_is_rejected(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(
        &app,
        request(
            "PUT",
            "/api/dashboards/settings",
            Some(&master.token),
            Some(json!({"dashboard_id": "r1", "assigned_users": [uuid::Uuid::new_v4()]})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Unknown users"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_organization_bound_setting_requires_membership(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let outsider = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    let org = body_json(
        send(
            &app,
            request(
                "POST",
                "/api/organizations",
                Some(&master.token),
                Some(json!({"name": "Acme"})),
            ),
        )
        .await,
    )
    .await;

    let response = send(
        &app,
        request(
            "PUT",
            "/api/dashboards/settings",
            Some(&master.token),
            Some(json!({
                "dashboard_id": "r1",
                "organization_id": org["id"],
                "assigned_users": [outsider.id]
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        request(
            "PUT",
            "/api/dashboards/settings",
            Some(&master.token),
            Some(json!({
                "dashboard_id": "r1",
                "organization_id": org["id"],
                "assigned_users": [master.id]
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_setting(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let app = setup_test_app(pool.clone()).await;
    common::create_dashboard_setting(&pool, "r1", true, &[], None).await;

    let response = send(
        &app,
        request("DELETE", "/api/dashboards/r1/settings", Some(&master.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        request("DELETE", "/api/dashboards/r1/settings", Some(&master.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_setting_roundtrip(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;
    let uri = format!("/api/dashboards/r1/users/{}/settings", user.id);

    let response = send(&app, request("GET", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        request("PUT", &uri, Some(&master.token), Some(json!({"rls_role": "Store"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request("GET", &uri, Some(&master.token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rls_role"], "Store");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_reads_settings_but_cannot_write(pool: PgPool) {
    let admin = create_test_user(&pool, AppRole::Admin).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    let response = send(&app, request("GET", "/api/dashboards/settings", Some(&admin.token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        request(
            "PUT",
            "/api/dashboards/settings",
            Some(&admin.token),
            Some(json!({"dashboard_id": "r1"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, request("GET", "/api/dashboards/settings", Some(&user.token), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
