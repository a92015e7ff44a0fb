// Request-level failures of /api/stats

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// A gauge every real host has (CPU, memory, root disk, I/O counters) could not be read.
    #[error("{gauge} unavailable: {reason:#}")]
    Gauge {
        gauge: &'static str,
        reason: anyhow::Error,
    },

    #[error("sampling task failed: {0}")]
    Sampling(#[from] tokio::task::JoinError),
}

impl StatsError {
    pub fn gauge(gauge: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |reason| StatsError::Gauge { gauge, reason }
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "stats snapshot failed");
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
