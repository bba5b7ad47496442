//! Axum route handlers for the Rank and Taxonomy APIs.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::AdminCaller;
use crate::errors::AppError;
use crate::models::role::{RankFilters, RoleSpec};
use crate::rate_limit::RateDecision;
use crate::ranking::pipeline::{RankOutcome, RankingPipeline, DEFAULT_TOP_K, PREFILTER_WINDOW};
use crate::ranking::taxonomy::CareerTaxonomy;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankRequest {
    pub role: RoleSpec,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub filters: Option<RankFilters>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: RankOutcome,
}

impl RankRequest {
    /// Checks the request and returns the effective top-K.
    fn validate(&self) -> Result<usize, AppError> {
        if self.role.title.trim().is_empty() {
            return Err(AppError::Validation("role.title is required".to_string()));
        }
        if !self.role.min_years.is_finite() || self.role.min_years < 0.0 {
            return Err(AppError::Validation(
                "role.minYears must be a non-negative number".to_string(),
            ));
        }
        match self.top_k {
            None => Ok(DEFAULT_TOP_K),
            Some(k) if (1..=PREFILTER_WINDOW as i64).contains(&k) => Ok(k as usize),
            Some(_) => Err(AppError::Validation(format!(
                "topK must be between 1 and {PREFILTER_WINDOW}"
            ))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rank
///
/// Ranks the filtered candidate pool against a role. Admin only, rate limited
/// per caller. AI failures never fail the request; they fall back locally.
pub async fn handle_rank(
    State(state): State<AppState>,
    caller: AdminCaller,
    body: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<RankResponse>, AppError> {
    match state.rate_limiter.check(&caller.rate_key).await {
        Ok(RateDecision::Allowed) => {}
        Ok(RateDecision::Limited { reset_time }) => {
            return Err(AppError::RateLimited { reset_time })
        }
        Err(e) => warn!(error = %e, "Rate limiter unavailable, allowing request"),
    }

    let Json(request) = body?;
    let top_k = request.validate()?;
    let filters = request.filters.unwrap_or_default();

    let outcome = RankingPipeline::new(
        state.store.as_ref(),
        state.ai_ranker.as_deref(),
        &state.taxonomy,
        state.matcher.as_ref(),
        state.config.ai_rank_timeout,
    )
    .run(&request.role, top_k, &filters)
    .await?;

    Ok(Json(RankResponse {
        success: true,
        outcome,
    }))
}

/// GET /api/v1/taxonomy
pub async fn handle_taxonomy(State(state): State<AppState>) -> Json<CareerTaxonomy> {
    Json(state.taxonomy.as_ref().clone())
}
