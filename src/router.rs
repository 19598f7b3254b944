use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router, middleware};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::auth::rbac_auth;
use crate::middleware::recovery::handle_panic;
use crate::middleware::request_id::request_id;
use crate::modules::items::router::init_items_router;
use crate::modules::permissions::router::init_permissions_router;
use crate::modules::roles::router::init_roles_router;
use crate::modules::users::router::{init_public_users_router, init_users_router};
use crate::state::AppState;
use crate::utils::response::{Envelope, Ok as OkEnvelope};

async fn health_check() -> Json<Envelope<&'static str>> {
    OkEnvelope::json("up")
}

pub fn init_router(state: AppState) -> Router {
    let management = init_items_router()
        .merge(init_permissions_router())
        .merge(init_roles_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), rbac_auth));

    let role_and_user = init_users_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), rbac_auth))
        .merge(init_public_users_router());

    let api_prefix = state.rbac_config.api_prefix.clone();

    // Documented paths are prefix-relative; the configured prefix goes in as
    // the server URL so the rendered docs track RBAC_API_PREFIX.
    let mut api_doc = ApiDoc::openapi();
    api_doc.servers = Some(vec![utoipa::openapi::Server::new(&api_prefix)]);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_doc.clone()))
        .merge(Scalar::with_url("/scalar", api_doc))
        .route("/health", get(health_check))
        .nest(
            &api_prefix,
            Router::new()
                .nest("/role/m", management)
                .nest("/rau", role_and_user),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(CatchPanicLayer::custom(handle_panic))
}
