pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::generation::handlers as generation;
use crate::history::handlers as history;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(generation::handle_list_templates))
        .route("/api/v1/taxes", post(generation::handle_compute_taxes))
        // Document pipeline
        .route(
            "/api/v1/documents/:doc_type/validate",
            post(generation::handle_validate),
        )
        .route(
            "/api/v1/documents/:doc_type/preview",
            post(generation::handle_preview),
        )
        .route(
            "/api/v1/documents/:doc_type/generate",
            post(generation::handle_generate),
        )
        // Session history
        .route(
            "/api/v1/history",
            get(history::handle_list_history).delete(history::handle_clear_history),
        )
        // Demo auth
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/register", post(auth::handle_register))
        .with_state(state)
}
