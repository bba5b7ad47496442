use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::ranking::ranker::CandidateRanker;
use crate::ranking::taxonomy::CareerTaxonomy;
use crate::scoring::keywords::{MatchPredicate, ScoringKeywords};
use crate::store::CvStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything here is read-only after startup; requests share no mutable state
/// beyond the rate limiter's counters.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CvStore>,
    /// Remote ranker, present only when an AI credential is configured.
    pub ai_ranker: Option<Arc<dyn CandidateRanker>>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub keywords: Arc<ScoringKeywords>,
    /// Pluggable keyword matcher. Default: case-insensitive substring.
    pub matcher: Arc<dyn MatchPredicate>,
    pub taxonomy: Arc<CareerTaxonomy>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State for handler tests: built-in keywords and taxonomy, no AI ranker.
    pub fn for_tests(store: Arc<dyn CvStore>) -> Self {
        use crate::rate_limit::InMemoryRateLimiter;
        use crate::scoring::keywords::SubstringMatch;

        let config = Config::for_tests();
        AppState {
            store,
            ai_ranker: None,
            rate_limiter: Arc::new(InMemoryRateLimiter::new(
                config.rate_limit_max_requests,
                config.rate_limit_window,
            )),
            keywords: Arc::new(ScoringKeywords::default()),
            matcher: Arc::new(SubstringMatch),
            taxonomy: Arc::new(CareerTaxonomy::builtin()),
            config,
        }
    }
}
