use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    add_permissions_to_role, add_sub_roles_to_role, create_role, delete_role, get_role,
    query_roles, remove_permissions_from_role, remove_sub_roles_from_role, update_role,
};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/role", post(create_role))
        .route("/role/{id}/addps", post(add_permissions_to_role))
        .route("/role/{id}/delps", post(remove_permissions_from_role))
        .route("/role/{id}/addsubroles", post(add_sub_roles_to_role))
        .route("/role/{id}/delsubroles", post(remove_sub_roles_from_role))
        .route(
            "/role/{id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/roles", get(query_roles))
}
