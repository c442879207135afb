// Bearer-token authentication
//
// Tokens are stored as SHA-256 hashes in auth_tokens. Every request
// resolves its bearer token to a user_id; all key queries are scoped by
// that id.

use crate::error::ApiError;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// SHA-256 hex digest of a token
pub fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Pull the bearer token out of the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get("authorization")
        .ok_or(ApiError::Unauthorized)?
        .to_str()
        .map_err(|_| ApiError::Unauthorized)?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)
}

/// Resolve the caller's user id, rejecting expired or unknown tokens
pub async fn authenticate(pool: &PgPool, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = bearer_token(headers)?;
    let hash = token_hash(token);

    let user_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT user_id FROM auth_tokens \
         WHERE token_hash = $1 AND (expires_at IS NULL OR expires_at > NOW())",
    )
    .bind(&hash)
    .fetch_optional(pool)
    .await?;

    user_id.ok_or(ApiError::Unauthorized)
}
