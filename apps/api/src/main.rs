mod auth;
mod config;
mod errors;
mod llm_client;
mod models;
mod rate_limit;
mod ranking;
mod routes;
mod scoring;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::rate_limit::{InMemoryRateLimiter, RateLimiter, RedisRateLimiter};
use crate::ranking::llm_ranker::LlmRanker;
use crate::ranking::ranker::CandidateRanker;
use crate::ranking::taxonomy::CareerTaxonomy;
use crate::routes::build_router;
use crate::scoring::keywords::{ScoringKeywords, SubstringMatch};
use crate::state::AppState;
use crate::store::postgres::{create_pool, PgCvStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent API v{}", env!("CARGO_PKG_VERSION"));

    errors::expose_error_details(!config.is_production());

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Rate limiter: Redis when configured, in-process otherwise
    let rate_limiter: Arc<dyn RateLimiter> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Rate limiter backed by Redis");
            Arc::new(RedisRateLimiter::new(
                client,
                config.rate_limit_max_requests,
                config.rate_limit_window,
            ))
        }
        None => {
            info!("Rate limiter kept in process");
            Arc::new(InMemoryRateLimiter::new(
                config.rate_limit_max_requests,
                config.rate_limit_window,
            ))
        }
    };

    // AI ranker only when a credential is configured
    let ai_ranker: Option<Arc<dyn CandidateRanker>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())?;
            info!("AI ranking enabled (model: {})", llm_client::MODEL);
            Some(Arc::new(LlmRanker::new(client)))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, ranking uses the heuristic fallback only");
            None
        }
    };

    let keywords = match &config.scoring_keywords_path {
        Some(path) => ScoringKeywords::from_file(path)?,
        None => ScoringKeywords::default(),
    };
    info!("Scoring keywords v{}", keywords.version);

    let taxonomy = match &config.taxonomy_path {
        Some(path) => CareerTaxonomy::from_file(path)?,
        None => CareerTaxonomy::builtin(),
    };
    info!("Career taxonomy loaded: {} fields", taxonomy.fields.len());

    // Build app state
    let state = AppState {
        store: Arc::new(PgCvStore::new(db)),
        ai_ranker,
        rate_limiter,
        keywords: Arc::new(keywords),
        matcher: Arc::new(SubstringMatch),
        taxonomy: Arc::new(taxonomy),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
