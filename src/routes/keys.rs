use axum::{
    routing::{delete, get},
    Router,
};
use crate::handlers::keys;
use crate::AppState;

pub fn keys_router() -> Router<AppState> {
    Router::new()
        .route("/", get(keys::list_keys).post(keys::create_key))
        .route("/:id", delete(keys::delete_key))
}
