mod common;

use axum::http::StatusCode;
use common::{ADMIN_USER, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

/// Builds item -> permission -> role and grants the role to `user_id`.
async fn grant_endpoint(app: axum::Router, user_id: &str, method: &str, path: &str) {
    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/item",
        Some(ADMIN_USER),
        Some(json!({
            "name": format!("{method} {path}"),
            "method": method,
            "path": path,
            "group": "test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/permission",
        Some(ADMIN_USER),
        Some(json!({ "name": format!("perm {method} {path}"), "item_ids": [item] })),
    )
    .await;
    let permission = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/role",
        Some(ADMIN_USER),
        Some(json!({ "name": format!("role {method} {path}"), "permission_ids": [permission] })),
    )
    .await;
    let role = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        "POST",
        "/api/rau/addroles",
        Some(ADMIN_USER),
        Some(json!({ "user_id": user_id, "role_ids": [role] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn granted_endpoint_is_callable_and_nothing_else(pool: PgPool) {
    let app = setup_test_app(pool).await;

    grant_endpoint(app.clone(), "u-viewer", "GET", "/api/role/m/items").await;

    let (status, _) = send(
        app.clone(),
        "GET",
        "/api/role/m/items",
        Some("u-viewer"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // same path, other method
    let (status, _) = send(
        app.clone(),
        "POST",
        "/api/role/m/item",
        Some("u-viewer"),
        Some(json!({
            "name": "sneaky",
            "method": "GET",
            "path": "/x",
            "group": "g"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn wildcard_segment_grants_matching_paths_only(pool: PgPool) {
    let app = setup_test_app(pool).await;

    grant_endpoint(app.clone(), "u-wild", "GET", "/api/role/m/role/*").await;

    let (_, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/role",
        Some(ADMIN_USER),
        Some(json!({ "name": "target" })),
    )
    .await;
    let role_id = body["data"]["id"].as_str().unwrap().to_string();

    // the wildcard stands for word characters only, so the id goes in
    // uuid simple form
    let simple_id = role_id.replace('-', "");
    let (status, _) = send(
        app.clone(),
        "GET",
        &format!("/api/role/m/role/{simple_id}"),
        Some("u-wild"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app, "GET", "/api/role/m/roles", Some("u-wild"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn wildcard_method_grants_all_methods_on_path(pool: PgPool) {
    let app = setup_test_app(pool).await;

    grant_endpoint(app.clone(), "u-any", "*", "/api/role/m/items").await;

    let (status, _) = send(
        app,
        "GET",
        "/api/role/m/items",
        Some("u-any"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn reseeding_never_touches_existing_rows(pool: PgPool) {
    use portcullis::config::rbac::RbacConfig;
    use portcullis::rbac::bootstrap::ensure_seed_data;

    let app = setup_test_app(pool.clone()).await;

    let (_, before) = send(
        app.clone(),
        "GET",
        "/api/role/m/roles?size=100",
        Some(ADMIN_USER),
        None,
    )
    .await;

    ensure_seed_data(&pool, &RbacConfig::default()).await.unwrap();

    let (_, after) = send(
        app,
        "GET",
        "/api/role/m/roles?size=100",
        Some(ADMIN_USER),
        None,
    )
    .await;
    assert_eq!(before["data"]["total"], after["data"]["total"]);
    assert_eq!(before["data"]["data"], after["data"]["data"]);
}

/// Builds item -> permission and attaches the permission to the Default Role.
async fn grant_to_default_role(app: axum::Router, method: &str, path: &str) {
    use portcullis::rbac::ids::DEFAULT_ROLE_ID;

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/item",
        Some(ADMIN_USER),
        Some(json!({
            "name": format!("default {method} {path}"),
            "method": method,
            "path": path,
            "group": "test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        app.clone(),
        "POST",
        "/api/role/m/permission",
        Some(ADMIN_USER),
        Some(json!({ "name": format!("default perm {method} {path}"), "item_ids": [item] })),
    )
    .await;
    let permission = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        "POST",
        &format!("/api/role/m/role/{DEFAULT_ROLE_ID}/addps"),
        Some(ADMIN_USER),
        Some(json!({ "permission_ids": [permission] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn default_role_grant_reaches_users_without_a_record(pool: PgPool) {
    let app = setup_test_app(pool).await;

    grant_to_default_role(app.clone(), "GET", "/api/role/m/items").await;

    // No role_users row exists for this user; the synthesized default-role
    // membership alone carries the grant.
    let (status, _) = send(app.clone(), "GET", "/api/role/m/items", Some("u-drifter"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app, "GET", "/api/role/m/roles", Some("u-drifter"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn explicit_record_still_carries_default_role_grants(pool: PgPool) {
    let app = setup_test_app(pool).await;

    grant_to_default_role(app.clone(), "GET", "/api/role/m/items").await;
    grant_endpoint(app.clone(), "u-member", "GET", "/api/role/m/permissions").await;

    // Explicitly granted role works.
    let (status, _) = send(
        app.clone(),
        "GET",
        "/api/role/m/permissions",
        Some("u-member"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The default role's grant rides along with the explicit record.
    let (status, _) = send(app, "GET", "/api/role/m/items", Some("u-member"), None).await;
    assert_eq!(status, StatusCode::OK);
}
