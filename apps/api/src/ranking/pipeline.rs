//! Ranking Pipeline: fetch → pre-score → pre-filter → top-K → (AI | fallback) → merge.
//!
//! The AI branch is contained: a failure, timeout or malformed response degrades to
//! the local fallback and never fails the request. Only the pool fetch can fail.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::candidate::Candidate;
use crate::models::role::{RankFilters, RoleSpec};
use crate::ranking::heuristic::HeuristicMatcher;
use crate::ranking::ranker::{
    Assessment, AtsReadiness, CandidateRanker, FallbackRanker, RankSource, RankingInput,
    ScoredCandidate,
};
use crate::ranking::taxonomy::CareerTaxonomy;
use crate::scoring::keywords::MatchPredicate;
use crate::store::CvStore;

/// Upper bound on candidates forwarded past the heuristic stage.
pub const PREFILTER_WINDOW: usize = 50;
pub const DEFAULT_TOP_K: usize = 10;

const TOP_REASONS: [&str; 3] = [
    "Must-have skills present in the strongest profiles",
    "Relevant project work alongside coursework",
    "Field of study aligned with the role",
];
const TOP_GAPS: [&str; 2] = [
    "Limited professional experience across the pool",
    "Nice-to-have skills rarely listed",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub candidate_id: Uuid,
    pub name: String,
    pub email: String,
    pub field_of_study: String,
    pub area_of_interest: String,
    pub heuristic_score: u32,
    pub final_score: u32,
    pub matched_skills: Vec<String>,
    pub reasons: Vec<String>,
    pub gaps: Vec<String>,
    pub ats_readiness: AtsReadiness,
    pub source: RankSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankSummary {
    pub role_title: String,
    pub total_candidates: usize,
    pub analyzed: usize,
    pub ranked_by: RankSource,
    pub top_reasons: Vec<String>,
    pub top_gaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankOutcome {
    pub summary: RankSummary,
    pub results: Vec<RankedCandidate>,
}

pub struct RankingPipeline<'a> {
    store: &'a dyn CvStore,
    ai_ranker: Option<&'a dyn CandidateRanker>,
    taxonomy: &'a CareerTaxonomy,
    matcher: &'a dyn MatchPredicate,
    ai_timeout: Duration,
}

impl<'a> RankingPipeline<'a> {
    pub fn new(
        store: &'a dyn CvStore,
        ai_ranker: Option<&'a dyn CandidateRanker>,
        taxonomy: &'a CareerTaxonomy,
        matcher: &'a dyn MatchPredicate,
        ai_timeout: Duration,
    ) -> Self {
        Self {
            store,
            ai_ranker,
            taxonomy,
            matcher,
            ai_timeout,
        }
    }

    pub async fn run(
        &self,
        role: &RoleSpec,
        top_k: usize,
        filters: &RankFilters,
    ) -> Result<RankOutcome, AppError> {
        let pool = self.store.fetch_pool(filters).await?;
        let total_candidates = pool.len();

        let mut window = self.prefilter(pool, role);
        window.truncate(top_k);

        let (mut assessments, ranked_by) = self.assess(role, &window).await;

        let mut results: Vec<RankedCandidate> = window
            .into_iter()
            .map(|scored| {
                let (assessment, source) = match assessments.remove(&scored.candidate.id) {
                    Some(a) => (a, ranked_by),
                    None => (FallbackRanker.assess(role, &scored), RankSource::Heuristic),
                };
                merge(scored, assessment, source)
            })
            .collect();
        // Vec::sort_by is stable: equal final scores keep pre-filter order.
        results.sort_by(|a, b| b.final_score.cmp(&a.final_score));

        info!(
            total_candidates,
            analyzed = results.len(),
            ranked_by = ?ranked_by,
            "Ranking complete"
        );

        Ok(RankOutcome {
            summary: RankSummary {
                role_title: role.title.clone(),
                total_candidates,
                analyzed: results.len(),
                ranked_by,
                top_reasons: TOP_REASONS.iter().map(|s| s.to_string()).collect(),
                top_gaps: TOP_GAPS.iter().map(|s| s.to_string()).collect(),
            },
            results,
        })
    }

    /// Heuristic-scores the pool, stable-sorts descending and keeps the first
    /// `PREFILTER_WINDOW` candidates.
    fn prefilter(&self, pool: Vec<Candidate>, role: &RoleSpec) -> Vec<ScoredCandidate> {
        let matcher = HeuristicMatcher::new(self.taxonomy, self.matcher);
        let mut scored: Vec<ScoredCandidate> = pool
            .into_iter()
            .map(|candidate| {
                let heuristic = matcher.score(&candidate, role);
                ScoredCandidate {
                    candidate,
                    heuristic,
                }
            })
            .collect();
        scored.sort_by(|a, b| b.heuristic.score.cmp(&a.heuristic.score));
        scored.truncate(PREFILTER_WINDOW);
        scored
    }

    /// Assessments keyed by candidate id from the AI ranker, or from the fallback
    /// ranker when the AI is absent, fails or times out.
    async fn assess(
        &self,
        role: &RoleSpec,
        window: &[ScoredCandidate],
    ) -> (HashMap<Uuid, Assessment>, RankSource) {
        let input = RankingInput {
            role,
            candidates: window,
            taxonomy: self.taxonomy,
        };

        if let Some(ai) = self.ai_ranker.filter(|_| !window.is_empty()) {
            let result = tokio::time::timeout(self.ai_timeout, ai.rank(&input))
                .await
                .unwrap_or(Err(LlmError::Timeout(self.ai_timeout)));

            match result {
                Ok(assessments) => {
                    let map = by_candidate(assessments);
                    if map.len() < window.len() {
                        info!(
                            returned = map.len(),
                            requested = window.len(),
                            "AI ranking omitted candidates, filling from heuristic fallback"
                        );
                    }
                    return (map, ai.source());
                }
                Err(e) => warn!(error = %e, "AI ranking unavailable, using heuristic fallback"),
            }
        }

        let fallback: &dyn CandidateRanker = &FallbackRanker;
        let assessments = fallback.rank(&input).await.unwrap_or_default();
        (by_candidate(assessments), fallback.source())
    }
}

fn by_candidate(assessments: Vec<Assessment>) -> HashMap<Uuid, Assessment> {
    assessments
        .into_iter()
        .map(|a| (a.candidate_id, a))
        .collect()
}

fn merge(scored: ScoredCandidate, assessment: Assessment, source: RankSource) -> RankedCandidate {
    let ScoredCandidate {
        candidate,
        heuristic,
    } = scored;
    let final_score = assessment.score.min(100);
    RankedCandidate {
        candidate_id: candidate.id,
        name: candidate.name,
        email: candidate.email,
        field_of_study: candidate.field_of_study,
        area_of_interest: candidate.area_of_interest,
        heuristic_score: heuristic.score,
        final_score,
        matched_skills: assessment.matched_skills,
        reasons: assessment.reasons,
        gaps: assessment.gaps,
        ats_readiness: AtsReadiness::from_score(final_score),
        source,
    }
}
