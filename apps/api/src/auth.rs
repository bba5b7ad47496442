//! Admin credential check for privileged routes.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Proof that the request carried the configured admin token.
///
/// Also records the rate-limit key, derived from the credential itself so that
/// request headers cannot move a caller into a fresh window.
#[derive(Debug, Clone)]
pub struct AdminCaller {
    pub rate_key: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;

        if !constant_time_eq(presented.as_bytes(), state.config.admin_token.as_bytes()) {
            tracing::warn!("Rejected admin request with an invalid token");
            return Err(AppError::Unauthorized);
        }

        Ok(AdminCaller {
            rate_key: credential_key(presented),
        })
    }
}

/// `rank:` plus the first 8 bytes of the token's SHA-256, hex encoded.
/// The raw token never reaches the limiter backend.
fn credential_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let short: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("rank:{short}")
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
