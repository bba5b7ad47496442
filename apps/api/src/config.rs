use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "test" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub admin_token: String,
    pub environment: Environment,
    /// AI ranking credential. `None` means ranking always uses the local fallback.
    pub anthropic_api_key: Option<String>,
    pub ai_rank_timeout: Duration,
    /// Distributed rate limiter backend. `None` keeps counters in process.
    pub redis_url: Option<String>,
    pub rate_limit_max_requests: u64,
    pub rate_limit_window: Duration,
    pub scoring_keywords_path: Option<PathBuf>,
    pub taxonomy_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            admin_token: require_env("ADMIN_TOKEN")?,
            environment: Environment::parse(
                &std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            )?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            ai_rank_timeout: Duration::from_secs(parse_env("AI_RANK_TIMEOUT_SECS", 30)?),
            redis_url: optional_env("REDIS_URL"),
            rate_limit_max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", 10)?,
            rate_limit_window: Duration::from_secs(parse_env("RATE_LIMIT_WINDOW_SECS", 60)?),
            scoring_keywords_path: optional_env("SCORING_KEYWORDS_PATH").map(PathBuf::from),
            taxonomy_path: optional_env("TAXONOMY_PATH").map(PathBuf::from),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for handler tests: no AI credential, in-process rate limiting.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            admin_token: "test-admin-token".to_string(),
            environment: Environment::Development,
            anthropic_api_key: None,
            ai_rank_timeout: Duration::from_secs(5),
            redis_url: None,
            rate_limit_max_requests: 100,
            rate_limit_window: Duration::from_secs(60),
            scoring_keywords_path: None,
            taxonomy_path: None,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
