use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_item, delete_item, get_item, query_items, update_item};

pub fn init_items_router() -> Router<AppState> {
    Router::new()
        .route("/item", post(create_item))
        .route(
            "/item/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items", get(query_items))
}
