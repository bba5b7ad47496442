// Candidate ranking: heuristic pre-filter, optional AI re-rank, local fallback.
// The AI call is the only suspension point; everything else is pure.

pub mod handlers;
pub mod heuristic;
pub mod llm_ranker;
pub mod pipeline;
pub mod prompts;
pub mod ranker;
pub mod taxonomy;
