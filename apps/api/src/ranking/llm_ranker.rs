//! Remote re-ranking through the LLM client.
//!
//! Profiles sent out are PII-stripped: the candidate is known to the model only by
//! id. Whatever comes back is validated here before the pipeline sees it.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::cv::{EducationEntry, ExperienceEntry, ProjectEntry, Skills};
use crate::ranking::prompts::{rank_system, RANK_PROMPT_TEMPLATE};
use crate::ranking::ranker::{
    Assessment, CandidateRanker, RankSource, RankingInput, ScoredCandidate, GAP_COUNT,
    REASON_COUNT,
};

/// What the model is allowed to see about a candidate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CandidateProfile<'a> {
    candidate_id: Uuid,
    field_of_study: &'a str,
    area_of_interest: &'a str,
    skills: &'a Skills,
    projects: &'a [ProjectEntry],
    experience: &'a [ExperienceEntry],
    education: &'a [EducationEntry],
    heuristic_score: u32,
}

impl<'a> From<&'a ScoredCandidate> for CandidateProfile<'a> {
    fn from(scored: &'a ScoredCandidate) -> Self {
        let c = &scored.candidate;
        Self {
            candidate_id: c.id,
            field_of_study: &c.field_of_study,
            area_of_interest: &c.area_of_interest,
            skills: &c.cv.skills,
            projects: &c.cv.project_entries,
            experience: &c.cv.experience_entries,
            education: &c.cv.education,
            heuristic_score: scored.heuristic.score,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
    rankings: Vec<RawRanking>,
}

/// `atsReadiness` is requested but ignored; it is recomputed from the final score.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRanking {
    candidate_id: String,
    score: f64,
    #[serde(default)]
    matched_skills: Vec<String>,
    reasons: Vec<String>,
    gaps: Vec<String>,
}

pub struct LlmRanker {
    client: LlmClient,
}

impl LlmRanker {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CandidateRanker for LlmRanker {
    fn source(&self) -> RankSource {
        RankSource::Ai
    }

    async fn rank(&self, input: &RankingInput<'_>) -> Result<Vec<Assessment>, LlmError> {
        let prompt = build_prompt(input)?;
        let response = self
            .client
            .call_json::<RankingResponse>(&prompt, &rank_system())
            .await?;
        validate_rankings(input.candidates, response)
    }
}

fn build_prompt(input: &RankingInput<'_>) -> Result<String, LlmError> {
    let profiles: Vec<CandidateProfile<'_>> =
        input.candidates.iter().map(CandidateProfile::from).collect();

    Ok(RANK_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{role_json}", &serde_json::to_string_pretty(input.role)?)
        .replace("{taxonomy_json}", &serde_json::to_string(input.taxonomy)?)
        .replace("{candidates_json}", &serde_json::to_string_pretty(&profiles)?))
}

/// Keeps rankings for candidates that were actually sent, first occurrence wins.
///
/// A ranking with the wrong number of reasons or gaps, a blank entry, or a
/// non-finite score makes the whole response malformed.
fn validate_rankings(
    sent: &[ScoredCandidate],
    response: RankingResponse,
) -> Result<Vec<Assessment>, LlmError> {
    let known: HashSet<Uuid> = sent.iter().map(|s| s.candidate.id).collect();
    let mut seen = HashSet::new();
    let mut assessments = Vec::with_capacity(response.rankings.len());

    for raw in response.rankings {
        let Some(id) = Uuid::parse_str(raw.candidate_id.trim())
            .ok()
            .filter(|id| known.contains(id))
        else {
            debug!("Dropping AI ranking for an id that was not sent");
            continue;
        };
        if !seen.insert(id) {
            continue;
        }

        if raw.reasons.len() != REASON_COUNT || raw.gaps.len() != GAP_COUNT {
            return Err(LlmError::Malformed(format!(
                "expected {REASON_COUNT} reasons and {GAP_COUNT} gaps, got {} and {}",
                raw.reasons.len(),
                raw.gaps.len()
            )));
        }
        if raw.reasons.iter().chain(&raw.gaps).any(|s| s.trim().is_empty()) {
            return Err(LlmError::Malformed("blank reason or gap".to_string()));
        }
        if !raw.score.is_finite() {
            return Err(LlmError::Malformed("non-numeric score".to_string()));
        }

        assessments.push(Assessment {
            candidate_id: id,
            score: raw.score.clamp(0.0, 100.0).round() as u32,
            matched_skills: raw
                .matched_skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            reasons: raw.reasons.into_iter().map(|s| s.trim().to_string()).collect(),
            gaps: raw.gaps.into_iter().map(|s| s.trim().to_string()).collect(),
        });
    }

    if assessments.is_empty() && !sent.is_empty() {
        return Err(LlmError::Malformed(
            "no rankings for any submitted candidate".to_string(),
        ));
    }

    Ok(assessments)
}
