pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::export::handlers::handle_export;
use crate::extract::handlers::{handle_extract, UPLOAD_BODY_HEADROOM};
use crate::extract::MAX_UPLOAD_BYTES;
use crate::optimize::handlers::handle_optimize;
use crate::persistence::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/optimize", post(handle_optimize))
        .route(
            "/api/v1/extract",
            post(handle_extract)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + UPLOAD_BODY_HEADROOM)),
        )
        .route("/api/v1/export/:format", post(handle_export))
        .route(
            "/api/v1/optimizations",
            get(handlers::handle_list_optimizations),
        )
        .route(
            "/api/v1/optimizations/:id",
            delete(handlers::handle_delete_optimization),
        )
        .route("/api/v1/usage", get(handlers::handle_get_usage))
        .with_state(state)
}
