use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Data source '{source_name}' unavailable: {reason}")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    #[error("Snapshot not ready: no fetch cycle has completed yet")]
    SnapshotNotReady,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn source_unavailable(source_name: &'static str, reason: impl ToString) -> Self {
        ApiError::SourceUnavailable {
            source_name,
            reason: reason.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::SnapshotNotReady => StatusCode::NOT_FOUND,
            ApiError::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
