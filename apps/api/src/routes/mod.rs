pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommend::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(handlers::handle_list_catalog))
        .route("/api/v1/catalog/:id", get(handlers::handle_get_course))
        .route(
            "/api/v1/recommendations",
            post(handlers::handle_recommend),
        )
        .route(
            "/api/v1/recommendations/export",
            post(handlers::handle_export),
        )
        .with_state(state)
}
