use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use portcullis::config::cors::CorsConfig;
use portcullis::config::rbac::RbacConfig;
use portcullis::rbac::bootstrap::ensure_seed_data;
use portcullis::router::init_router;
use portcullis::state::AppState;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

/// Matches `RbacConfig::default().admin_user_id`.
pub const ADMIN_USER: &str = "admin";

/// Seeds the database and builds the router with default config.
pub async fn setup_test_app(pool: PgPool) -> Router {
    let cfg = RbacConfig::default();
    ensure_seed_data(&pool, &cfg).await.unwrap();

    let state = AppState {
        db: pool,
        cors_config: CorsConfig::default(),
        rbac_config: cfg,
    };
    init_router(state)
}

/// Sends one request and parses the envelope. `user_id` becomes the
/// `x-user-id` header when given.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(uid) = user_id {
        builder = builder.header("x-user-id", uid);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "unparseable response body, status {}: {:?}",
                status,
                String::from_utf8_lossy(&bytes)
            )
        })
    };

    (status, value)
}
