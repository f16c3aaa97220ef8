use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, workflow};
use crate::state::AppState;

/// Largest accepted extraction upload (both documents together).
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Workflow
        .route("/workflow", get(workflow::get_snapshot))
        .route(
            "/workflow/extract",
            post(workflow::extract).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/workflow/fields", patch(workflow::edit_fields))
        .route("/workflow/run", post(workflow::run))
        .route("/workflow/reset", post(workflow::reset))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
