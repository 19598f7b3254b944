use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{add_roles_to_user, get_user_roles, query_role_users, remove_roles_from_user};

/// Routes that require an authorized caller.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/addroles", post(add_roles_to_user))
        .route("/delroles", post(remove_roles_from_user))
        .route("/users", get(query_role_users))
}

/// Open lookup of a user's role summaries, for upstream services.
pub fn init_public_users_router() -> Router<AppState> {
    Router::new().route("/user/{id}", get(get_user_roles))
}
