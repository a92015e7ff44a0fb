// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::composer::StatsComposer;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) composer: Arc<StatsComposer>,
}

pub fn app(composer: Arc<StatsComposer>) -> Router {
    let state = AppState { composer };
    Router::new()
        .route("/", get(|| async { "hoststats: GET /api/stats for a JSON snapshot" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/stats", get(http::stats_handler)) // GET /api/stats
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
