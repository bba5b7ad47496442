//! In-memory CV Store used by handler and pipeline tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::Candidate;
use crate::models::role::RankFilters;
use crate::scoring::gpa::cv_gpa;
use crate::scoring::rubric::ScoreResult;
use crate::store::CvStore;

#[derive(Default)]
pub struct InMemoryCvStore {
    candidates: Vec<Candidate>,
    scores: Mutex<HashMap<Uuid, ScoreResult>>,
}

impl InMemoryCvStore {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            scores: Mutex::new(HashMap::new()),
        }
    }

    pub async fn saved_score(&self, id: Uuid) -> Option<ScoreResult> {
        self.scores.lock().await.get(&id).cloned()
    }
}

fn matches_filters(candidate: &Candidate, filters: &RankFilters) -> bool {
    let eq = |wanted: &Option<String>, actual: &str| {
        wanted
            .as_deref()
            .map(|w| w.trim().eq_ignore_ascii_case(actual.trim()))
            .unwrap_or(true)
    };
    let gpa_ok = filters
        .min_gpa
        .map(|min| cv_gpa(&candidate.cv).is_some_and(|gpa| gpa >= min))
        .unwrap_or(true);
    let language_ok = filters
        .language
        .as_deref()
        .map(|wanted| {
            let wanted = wanted.to_lowercase();
            candidate
                .cv
                .skills
                .languages
                .iter()
                .any(|l| l.to_lowercase().contains(&wanted))
        })
        .unwrap_or(true);

    eq(&filters.field_of_study, &candidate.field_of_study)
        && eq(&filters.area_of_interest, &candidate.area_of_interest)
        && filters
            .graduation_year
            .map(|y| candidate.graduation_year == Some(y))
            .unwrap_or(true)
        && gpa_ok
        && language_ok
}

#[async_trait]
impl CvStore for InMemoryCvStore {
    async fn fetch_pool(&self, filters: &RankFilters) -> Result<Vec<Candidate>, AppError> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| matches_filters(c, filters))
            .cloned()
            .collect())
    }

    async fn fetch_candidate(&self, id: Uuid) -> Result<Option<Candidate>, AppError> {
        Ok(self.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn save_score(&self, id: Uuid, score: &ScoreResult) -> Result<(), AppError> {
        self.scores.lock().await.insert(id, score.clone());
        Ok(())
    }
}

/// A store whose every call fails, for exercising the 500 path.
pub struct UnavailableCvStore;

#[async_trait]
impl CvStore for UnavailableCvStore {
    async fn fetch_pool(&self, _filters: &RankFilters) -> Result<Vec<Candidate>, AppError> {
        Err(AppError::Internal(anyhow::anyhow!("candidate store unavailable")))
    }

    async fn fetch_candidate(&self, _id: Uuid) -> Result<Option<Candidate>, AppError> {
        Err(AppError::Internal(anyhow::anyhow!("candidate store unavailable")))
    }

    async fn save_score(&self, _id: Uuid, _score: &ScoreResult) -> Result<(), AppError> {
        Err(AppError::Internal(anyhow::anyhow!("candidate store unavailable")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{EducationEntry, StructuredCv};
    use crate::scoring::keywords::{ScoringKeywords, SubstringMatch};
    use crate::scoring::rubric::RubricScorer;
    use serde_json::json;

    fn graduate(education: Vec<EducationEntry>) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            name: "Grad".to_string(),
            email: "grad@example.com".to_string(),
            phone: None,
            field_of_study: " Computer Science ".to_string(),
            area_of_interest: "Backend".to_string(),
            suggested_vacancy: String::new(),
            graduation_year: Some(2024),
            parsed_text: String::new(),
            cv: StructuredCv {
                education,
                ..Default::default()
            },
        }
    }

    fn entry(gpa: Option<serde_json::Value>) -> EducationEntry {
        EducationEntry {
            degree: "BSc".to_string(),
            gpa,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_min_gpa_filter_agrees_with_scored_gpa() {
        let candidate = graduate(vec![entry(None), entry(Some(json!("92")))]);
        let keywords = ScoringKeywords::default();
        let scored = RubricScorer::new(&keywords, &SubstringMatch).score(&candidate.cv);
        let stored = scored.normalized_gpa.unwrap();
        let store = InMemoryCvStore::new(vec![candidate]);

        let at_stored = RankFilters {
            min_gpa: Some(stored),
            ..Default::default()
        };
        assert_eq!(store.fetch_pool(&at_stored).await.unwrap().len(), 1);

        let above_stored = RankFilters {
            min_gpa: Some(stored + 0.01),
            ..Default::default()
        };
        assert!(store.fetch_pool(&above_stored).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_field_filter_is_trimmed_exact_match() {
        let store = InMemoryCvStore::new(vec![graduate(vec![])]);

        let exact = RankFilters {
            field_of_study: Some("computer science".to_string()),
            ..Default::default()
        };
        assert_eq!(store.fetch_pool(&exact).await.unwrap().len(), 1);

        let partial = RankFilters {
            field_of_study: Some("Computer".to_string()),
            ..Default::default()
        };
        assert!(store.fetch_pool(&partial).await.unwrap().is_empty());
    }
}
