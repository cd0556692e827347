//! Optional HTTP endpoint for liveness checks and live game counts.

use crate::game::matchmaking::{MatchmakingState, ServerStats};
use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;

async fn health() -> &'static str {
    "ok"
}

async fn stats(State(state): State<Arc<MatchmakingState>>) -> Json<ServerStats> {
    Json(state.stats())
}

pub fn router(state: Arc<MatchmakingState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .with_state(state)
}
