use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    add_items_to_permission, create_permission, delete_permission, get_permission,
    query_permissions, remove_items_from_permission, update_permission,
};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/permission", post(create_permission))
        .route("/permission/{id}/additems", post(add_items_to_permission))
        .route(
            "/permission/{id}/delitems",
            post(remove_items_from_permission),
        )
        .route(
            "/permission/{id}",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
        .route("/permissions", get(query_permissions))
}
