mod common;

use axum::http::StatusCode;
use common::{ADMIN_USER, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn create_get_update_delete_item(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/item",
        Some(ADMIN_USER),
        Some(json!({
            "name": "cats:read",
            "method": "get",
            "path": "/api/cat/{id}",
            "group": "cats"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["method"], "GET");
    assert_eq!(body["data"]["path"], "/api/cat/*");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app.clone(),
        "GET",
        &format!("/api/role/m/item/{id}"),
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "cats:read");

    let (status, body) = send(
        app.clone(),
        "PUT",
        &format!("/api/role/m/item/{id}"),
        Some(ADMIN_USER),
        Some(json!({
            "name": "cats:read",
            "method": "GET",
            "path": "/api/cats/{id}",
            "group": "cats"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["path"], "/api/cats/*");

    let (status, _) = send(
        app.clone(),
        "DELETE",
        &format!("/api/role/m/item/{id}"),
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // default listing hides soft-deleted records
    let (status, body) = send(
        app.clone(),
        "GET",
        "/api/role/m/items?name=cats",
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let (status, body) = send(
        app,
        "GET",
        "/api/role/m/items?name=cats&deleted=true",
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_item_name_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let item = json!({
        "name": "dup",
        "method": "GET",
        "path": "/api/x",
        "group": "g"
    });

    let (status, _) = send(
        app.clone(),
        "POST",
        "/api/role/m/item",
        Some(ADMIN_USER),
        Some(item.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/api/role/m/item",
        Some(ADMIN_USER),
        Some(item),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[sqlx::test(migrations = "./migrations")]
async fn missing_identity_header_is_401(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let (status, body) = send(app, "GET", "/api/role/m/items", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_user_is_403(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let (status, body) = send(app, "GET", "/api/role/m/items", Some("nobody"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);
}

#[sqlx::test(migrations = "./migrations")]
async fn seeded_admin_item_is_hidden_from_listing(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let (status, body) = send(
        app,
        "GET",
        "/api/role/m/items?name=adminItem",
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
}
