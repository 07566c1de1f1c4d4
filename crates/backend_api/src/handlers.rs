use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{error::ApiError, orchestrator::Orchestrator, Result};

pub type AppState = Arc<Orchestrator>;

/// GET /api/dashboard
/// Returns the current snapshot, derived metrics and cycle status
pub async fn get_dashboard(State(orchestrator): State<AppState>) -> Result<impl IntoResponse> {
    let view = orchestrator.state().view().await;

    let etag = format!("\"cycle-{}\"", view.cycle);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ETAG,
        HeaderValue::from_str(&etag).map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Ok((StatusCode::OK, headers, Json(view)))
}

/// GET /api/dashboard/activity
/// Returns only the recent activity feed of the latest snapshot
pub async fn get_activity(State(orchestrator): State<AppState>) -> Result<impl IntoResponse> {
    let snapshot = orchestrator
        .state()
        .snapshot()
        .await
        .ok_or(ApiError::SnapshotNotReady)?;

    Ok(Json(snapshot.activity))
}

/// POST /api/dashboard/refresh
/// Starts a new fetch cycle; any cycle still in flight is superseded
pub async fn refresh(State(orchestrator): State<AppState>) -> impl IntoResponse {
    let (cycle, _handle) = orchestrator.trigger().await;

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "accepted",
            "cycle": cycle,
        })),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dealer-dashboard-api"
    }))
}
