use std::sync::Arc;
use axum::Router;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod database;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::Store>,
    pub config: config::Settings,
}

/// Create the main Axum application router
pub fn create_app(state: AppState) -> Router {
    // Register API documentation
    let api_prefix = state.config.server.api_prefix.clone();
    let openapi = openapi::api_doc(&api_prefix);

    Router::new()
        .nest(&api_prefix, routes::api::api_router())
        // Health and monitoring endpoints
        .merge(routes::health::health_router())
        // Serve Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}
