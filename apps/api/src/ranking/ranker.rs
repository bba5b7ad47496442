//! Candidate rankers: the seam between the pipeline and whoever produces the final
//! per-candidate assessment.
//!
//! Two implementations: `LlmRanker` (remote, may fail) and `FallbackRanker`
//! (local, deterministic, never fails). The pipeline picks between them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm_client::LlmError;
use crate::models::candidate::Candidate;
use crate::models::role::RoleSpec;
use crate::ranking::heuristic::HeuristicMatch;
use crate::ranking::taxonomy::CareerTaxonomy;

pub const REASON_COUNT: usize = 3;
pub const GAP_COUNT: usize = 2;

/// Banded label for an overall score: high > 75, medium 50–75, low < 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtsReadiness {
    High,
    Medium,
    Low,
}

impl AtsReadiness {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s > 75 => AtsReadiness::High,
            s if s >= 50 => AtsReadiness::Medium,
            _ => AtsReadiness::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankSource {
    Ai,
    Heuristic,
}

/// A pooled candidate with its heuristic match attached.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub heuristic: HeuristicMatch,
}

pub struct RankingInput<'a> {
    pub role: &'a RoleSpec,
    pub candidates: &'a [ScoredCandidate],
    pub taxonomy: &'a CareerTaxonomy,
}

/// One ranker's verdict on one candidate. Carries no identity beyond the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub candidate_id: Uuid,
    pub score: u32,
    pub matched_skills: Vec<String>,
    /// Exactly `REASON_COUNT` entries.
    pub reasons: Vec<String>,
    /// Exactly `GAP_COUNT` entries.
    pub gaps: Vec<String>,
}

#[async_trait]
pub trait CandidateRanker: Send + Sync {
    fn source(&self) -> RankSource;

    async fn rank(&self, input: &RankingInput<'_>) -> Result<Vec<Assessment>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// FallbackRanker
// ────────────────────────────────────────────────────────────────────────────

/// Local ranker: final score equals the heuristic score, and reasons/gaps are
/// rendered from the candidate's own fields and the heuristic match.
pub struct FallbackRanker;

impl FallbackRanker {
    pub fn assess(&self, role: &RoleSpec, scored: &ScoredCandidate) -> Assessment {
        let heuristic = &scored.heuristic;
        let candidate = &scored.candidate;
        let experience_count = candidate.cv.experience_entries.len();
        let project_count = candidate.cv.project_entries.len();

        let skill_reason = if role.must_have_skills.is_empty() {
            "No must-have skills specified for this role".to_string()
        } else if heuristic.matched_must_have.is_empty() {
            format!(
                "Matches 0 of {} must-have skills",
                role.must_have_skills.len()
            )
        } else {
            format!(
                "Matches {} of {} must-have skills: {}",
                heuristic.matched_must_have.len(),
                role.must_have_skills.len(),
                heuristic.matched_must_have.join(", ")
            )
        };

        let field_reason = match candidate.field_of_study.trim() {
            "" => "Field of study not provided".to_string(),
            field => format!("Field of study: {field}"),
        };

        let background_reason = format!(
            "{project_count} project(s) and {experience_count} experience entries listed"
        );

        let skill_gap = if heuristic.missing_must_have.is_empty() {
            "No missing must-have skills".to_string()
        } else {
            format!(
                "Missing must-have skills: {}",
                heuristic.missing_must_have.join(", ")
            )
        };

        let secondary_gap = if (experience_count as f64) < role.min_years {
            format!(
                "{experience_count} experience entries against a minimum of {}",
                format_years(role.min_years)
            )
        } else if !heuristic.missing_nice_to_have.is_empty() {
            format!(
                "Missing nice-to-have skills: {}",
                heuristic.missing_nice_to_have.join(", ")
            )
        } else {
            "No experience or nice-to-have gaps detected".to_string()
        };

        Assessment {
            candidate_id: candidate.id,
            score: heuristic.score,
            matched_skills: heuristic.matched_must_have.clone(),
            reasons: vec![skill_reason, field_reason, background_reason],
            gaps: vec![skill_gap, secondary_gap],
        }
    }
}

#[async_trait]
impl CandidateRanker for FallbackRanker {
    fn source(&self) -> RankSource {
        RankSource::Heuristic
    }

    async fn rank(&self, input: &RankingInput<'_>) -> Result<Vec<Assessment>, LlmError> {
        Ok(input
            .candidates
            .iter()
            .map(|scored| self.assess(input.role, scored))
            .collect())
    }
}

fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{years:.0}")
    } else {
        format!("{years}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{ExperienceEntry, StructuredCv};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scored(field: &str, experience: usize, heuristic: HeuristicMatch) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                id: Uuid::new_v4(),
                name: "Test Candidate".to_string(),
                email: "candidate@example.com".to_string(),
                phone: None,
                field_of_study: field.to_string(),
                area_of_interest: String::new(),
                suggested_vacancy: String::new(),
                graduation_year: None,
                parsed_text: String::new(),
                cv: StructuredCv {
                    experience_entries: vec![ExperienceEntry::default(); experience],
                    ..Default::default()
                },
            },
            heuristic,
        }
    }

    fn role() -> RoleSpec {
        RoleSpec {
            title: "Backend Developer".to_string(),
            must_have_skills: strings(&["Rust", "SQL"]),
            nice_to_have_skills: strings(&["Kafka"]),
            min_years: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_ats_readiness_bands() {
        assert_eq!(AtsReadiness::from_score(100), AtsReadiness::High);
        assert_eq!(AtsReadiness::from_score(76), AtsReadiness::High);
        assert_eq!(AtsReadiness::from_score(75), AtsReadiness::Medium);
        assert_eq!(AtsReadiness::from_score(50), AtsReadiness::Medium);
        assert_eq!(AtsReadiness::from_score(49), AtsReadiness::Low);
        assert_eq!(AtsReadiness::from_score(0), AtsReadiness::Low);
    }

    #[test]
    fn test_ats_readiness_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AtsReadiness::Medium).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn test_fallback_keeps_heuristic_score_and_shape() {
        let heuristic = HeuristicMatch {
            score: 62,
            matched_must_have: strings(&["Rust"]),
            missing_must_have: strings(&["SQL"]),
            matched_nice_to_have: vec![],
            missing_nice_to_have: strings(&["Kafka"]),
        };
        let scored = scored("Computer Science", 1, heuristic);
        let assessment = FallbackRanker.assess(&role(), &scored);

        assert_eq!(assessment.score, 62);
        assert_eq!(assessment.matched_skills, strings(&["Rust"]));
        assert_eq!(assessment.reasons.len(), REASON_COUNT);
        assert_eq!(assessment.gaps.len(), GAP_COUNT);
        assert_eq!(assessment.reasons[0], "Matches 1 of 2 must-have skills: Rust");
        assert_eq!(assessment.reasons[1], "Field of study: Computer Science");
        assert_eq!(
            assessment.reasons[2],
            "0 project(s) and 1 experience entries listed"
        );
        assert_eq!(assessment.gaps[0], "Missing must-have skills: SQL");
        assert_eq!(
            assessment.gaps[1],
            "1 experience entries against a minimum of 2"
        );
    }

    #[test]
    fn test_fallback_without_gaps() {
        let heuristic = HeuristicMatch {
            score: 90,
            matched_must_have: strings(&["Rust", "SQL"]),
            missing_must_have: vec![],
            matched_nice_to_have: strings(&["Kafka"]),
            missing_nice_to_have: vec![],
        };
        let scored = scored("", 3, heuristic);
        let assessment = FallbackRanker.assess(&role(), &scored);

        assert_eq!(assessment.reasons[1], "Field of study not provided");
        assert_eq!(assessment.gaps[0], "No missing must-have skills");
        assert_eq!(
            assessment.gaps[1],
            "No experience or nice-to-have gaps detected"
        );
    }

    #[tokio::test]
    async fn test_fallback_ranker_never_fails() {
        let heuristic = HeuristicMatch {
            score: 10,
            matched_must_have: vec![],
            missing_must_have: strings(&["Rust", "SQL"]),
            matched_nice_to_have: vec![],
            missing_nice_to_have: strings(&["Kafka"]),
        };
        let candidates = vec![scored("Physics", 0, heuristic)];
        let role = role();
        let taxonomy = CareerTaxonomy::builtin();
        let input = RankingInput {
            role: &role,
            candidates: &candidates,
            taxonomy: &taxonomy,
        };

        let assessments = FallbackRanker.rank(&input).await.unwrap();
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].reasons[0], "Matches 0 of 2 must-have skills");
        assert_eq!(FallbackRanker.source(), RankSource::Heuristic);
    }

    #[test]
    fn test_format_years() {
        assert_eq!(format_years(2.0), "2");
        assert_eq!(format_years(1.5), "1.5");
    }
}
