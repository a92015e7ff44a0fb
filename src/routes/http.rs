// GET handlers: version, api/stats

use axum::{Json, extract::State, response::IntoResponse};

use super::AppState;
use crate::error::StatsError;
use crate::models::StatsSnapshot;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/stats: composes a fresh snapshot per request.
pub(super) async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsSnapshot>, StatsError> {
    state.composer.compose().await.map(Json)
}
