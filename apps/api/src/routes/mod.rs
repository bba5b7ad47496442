pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ranking::handlers as ranking;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Score API
        .route("/api/v1/cv/score", post(scoring::handle_score_cv))
        .route(
            "/api/v1/candidates/:id/score",
            post(scoring::handle_score_candidate),
        )
        // Rank API (admin)
        .route("/api/v1/rank", post(ranking::handle_rank))
        .route("/api/v1/taxonomy", get(ranking::handle_taxonomy))
        .with_state(state)
}
