use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, orchestrator::Orchestrator};

/// Create the main application router with all API endpoints
pub fn create_router(orchestrator: Arc<Orchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dashboard/activity", get(handlers::get_activity))
        .route("/api/dashboard/refresh", post(handlers::refresh))
        .with_state(orchestrator)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
