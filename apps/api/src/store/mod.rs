//! CV Store: the external owner of candidate records and persisted scores.
//!
//! The engine only reads candidates and hands back scores; filtering is pushed
//! down to the store unchanged.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::Candidate;
use crate::models::role::RankFilters;
use crate::scoring::rubric::ScoreResult;

#[async_trait]
pub trait CvStore: Send + Sync {
    /// Candidates matching `filters`, in the store's stable pool order.
    async fn fetch_pool(&self, filters: &RankFilters) -> Result<Vec<Candidate>, AppError>;

    async fn fetch_candidate(&self, id: Uuid) -> Result<Option<Candidate>, AppError>;

    /// Persists the latest score for a candidate, replacing any previous one.
    async fn save_score(&self, id: Uuid, score: &ScoreResult) -> Result<(), AppError>;
}
