use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, patch},
    Router,
};

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::check))
        // Mount auth routes under /auth prefix
        .nest("/auth", super::auth::auth_router())
        // Mount API key routes under /keys prefix
        .nest("/keys", super::keys::keys_router())
        .route("/users/me", patch(handlers::users::update_me))
        .route("/metrics", get(handlers::metrics::get_metrics))
}
