//! Axum route handlers for the Score API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cv::StructuredCv;
use crate::scoring::hygiene::clean_cv;
use crate::scoring::rubric::{CategoryBreakdown, RubricScorer, ScoreResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// `form` is the legacy name for `cv`; `cv` wins when both are present.
#[derive(Debug, Deserialize)]
pub struct ScoreCvRequest {
    #[serde(default)]
    pub cv: Option<StructuredCv>,
    #[serde(default)]
    pub form: Option<StructuredCv>,
}

#[derive(Debug, Serialize)]
pub struct ScoreCvResponse {
    #[serde(rename = "displayGPA")]
    pub display_gpa: String,
    pub candidate_score: u32,
    pub score_reasons: Vec<String>,
    pub category_breakdown: CategoryBreakdown,
    pub cv: StructuredCv,
}

#[derive(Debug, Serialize)]
pub struct ScoreCandidateResponse {
    #[serde(rename = "candidateId")]
    pub candidate_id: Uuid,
    #[serde(flatten)]
    pub score: ScoreResult,
}

fn score_cv(state: &AppState, cv: &StructuredCv) -> ScoreResult {
    RubricScorer::new(&state.keywords, state.matcher.as_ref()).score(cv)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/score
///
/// Cleans and scores a CV submitted inline. Nothing is persisted.
pub async fn handle_score_cv(
    State(state): State<AppState>,
    body: Result<Json<ScoreCvRequest>, JsonRejection>,
) -> Result<Json<ScoreCvResponse>, AppError> {
    let Json(request) = body?;
    let cv = request
        .cv
        .or(request.form)
        .ok_or_else(|| AppError::Validation("Request body must contain `cv`".to_string()))?;

    let cv = clean_cv(cv);
    let result = score_cv(&state, &cv);

    Ok(Json(ScoreCvResponse {
        display_gpa: result.display_gpa,
        candidate_score: result.total,
        score_reasons: result.reasons,
        category_breakdown: result.category_breakdown,
        cv,
    }))
}

/// POST /api/v1/candidates/:id/score
///
/// Scores the stored CV of one candidate and persists the result.
pub async fn handle_score_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScoreCandidateResponse>, AppError> {
    let candidate = state
        .store
        .fetch_candidate(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;

    let score = score_cv(&state, &clean_cv(candidate.cv));
    state.store.save_score(id, &score).await?;

    info!(candidate_id = %id, total = score.total, "Candidate score saved");

    Ok(Json(ScoreCandidateResponse {
        candidate_id: id,
        score,
    }))
}
