mod common;

use axum::http::StatusCode;
use serde_json::Value;
use sqlx::PgPool;

use common::{body_json, create_test_user, request, send, setup_test_app};
use dashgate::dashgate_models::AppRole;

fn keys(items: &Value) -> Vec<&str> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap())
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_menu_by_role(pool: PgPool) {
    let master = create_test_user(&pool, AppRole::AdminMaster).await;
    let admin = create_test_user(&pool, AppRole::Admin).await;
    let user = create_test_user(&pool, AppRole::User).await;
    let app = setup_test_app(pool.clone()).await;

    let menu = body_json(send(&app, request("GET", "/api/navigation", Some(&master.token), None)).await).await;
    assert_eq!(menu["role"], "admin_master");
    assert_eq!(keys(&menu["main"]), vec!["home", "powerbi", "tv_dashboards"]);
    assert_eq!(
        keys(&menu["admin"]),
        vec!["dashboard_management", "tv_management", "users", "powerbi_clients"]
    );

    let menu = body_json(send(&app, request("GET", "/api/navigation", Some(&admin.token), None)).await).await;
    assert_eq!(keys(&menu["main"]), vec!["home", "powerbi", "tv_dashboards"]);
    assert!(keys(&menu["admin"]).is_empty());

    let menu = body_json(send(&app, request("GET", "/api/navigation", Some(&user.token), None)).await).await;
    assert_eq!(keys(&menu["main"]), vec!["home", "powerbi"]);
    assert!(keys(&menu["admin"]).is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_menu_requires_authentication(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let response = send(&app, request("GET", "/api/navigation", None, None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
