mod common;

use axum::http::StatusCode;
use common::{ADMIN_USER, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

async fn create_item(app: axum::Router, name: &str, path: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/role/m/item",
        Some(ADMIN_USER),
        Some(json!({
            "name": name,
            "method": "GET",
            "path": path,
            "group": "test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "./migrations")]
async fn create_permission_and_manage_items(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let item_a = create_item(app.clone(), "a:read", "/api/a").await;
    let item_b = create_item(app.clone(), "b:read", "/api/b").await;

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/permission",
        Some(ADMIN_USER),
        Some(json!({ "name": "readers", "item_ids": [item_a] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pid = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app.clone(),
        "POST",
        &format!("/api/role/m/permission/{pid}/additems"),
        Some(ADMIN_USER),
        Some(json!({ "item_ids": [item_a, item_b] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // detail view expands the referenced items
    let (status, body) = send(
        app.clone(),
        "GET",
        &format!("/api/role/m/permission/{pid}"),
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        app.clone(),
        "POST",
        &format!("/api/role/m/permission/{pid}/delitems"),
        Some(ADMIN_USER),
        Some(json!({ "item_ids": [item_a] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "GET",
        &format!("/api/role/m/permission/{pid}"),
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "b:read");
}

#[sqlx::test(migrations = "./migrations")]
async fn deleted_permission_rejects_item_changes(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let (_, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/permission",
        Some(ADMIN_USER),
        Some(json!({ "name": "gone" })),
    )
    .await;
    let pid = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app.clone(),
        "DELETE",
        &format!("/api/role/m/permission/{pid}"),
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let item = create_item(app.clone(), "x:read", "/api/x").await;
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/role/m/permission/{pid}/additems"),
        Some(ADMIN_USER),
        Some(json!({ "item_ids": [item] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40000);
}

#[sqlx::test(migrations = "./migrations")]
async fn rename_restores_deleted_permission(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let (_, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/permission",
        Some(ADMIN_USER),
        Some(json!({ "name": "phoenix" })),
    )
    .await;
    let pid = body["data"]["id"].as_str().unwrap().to_string();

    send(
        app.clone(),
        "DELETE",
        &format!("/api/role/m/permission/{pid}"),
        Some(ADMIN_USER),
        None,
    )
    .await;

    let (status, _) = send(
        app.clone(),
        "PUT",
        &format!("/api/role/m/permission/{pid}"),
        Some(ADMIN_USER),
        Some(json!({ "name": "phoenix2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "GET",
        &format!("/api/role/m/permission/{pid}"),
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], false);
    assert_eq!(body["data"]["name"], "phoenix2");
}

#[sqlx::test(migrations = "./migrations")]
async fn listing_hides_seeded_admin_permission(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let (status, body) = send(
        app,
        "GET",
        "/api/role/m/permissions?name=adminPermission",
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
}
