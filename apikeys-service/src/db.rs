// Database layer for the API key service
//
// All key queries are scoped by user_id; tenant isolation happens at the
// query level, not the schema level. The secret hash is never selected
// into a response row.

use crate::keys::{RequestSample, UpdateKeyRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// One API key row as returned to the caller (secret hash excluded)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiKeyRow {
    pub id: Uuid,
    pub name: String,
    pub api_key: String,
    pub status: String,
    pub permissions: serde_json::Value,
    pub rate_limit: i32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const KEY_COLUMNS: &str = "id, name, api_key, status, permissions, rate_limit, \
                           last_used_at, expires_at, created_at, updated_at";

/// List the caller's keys, newest first
pub async fn list_keys(pool: &PgPool, user_id: Uuid) -> Result<Vec<ApiKeyRow>, sqlx::Error> {
    sqlx::query_as::<_, ApiKeyRow>(&format!(
        "SELECT {} FROM api_keys WHERE user_id = $1 ORDER BY created_at DESC",
        KEY_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Insert a new key and return the stored row
#[allow(clippy::too_many_arguments)]
pub async fn insert_key(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    api_key: &str,
    secret_hash: &str,
    permissions: &serde_json::Value,
    rate_limit: i32,
    expires_at: Option<DateTime<Utc>>,
) -> Result<ApiKeyRow, sqlx::Error> {
    sqlx::query_as::<_, ApiKeyRow>(&format!(
        "INSERT INTO api_keys \
         (user_id, name, api_key, secret_hash, permissions, rate_limit, expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {}",
        KEY_COLUMNS
    ))
    .bind(user_id)
    .bind(name)
    .bind(api_key)
    .bind(secret_hash)
    .bind(permissions)
    .bind(rate_limit)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Partial update via COALESCE, scoped to the owning user.
///
/// Returns None when no row matched (wrong id or wrong owner).
pub async fn update_key(
    pool: &PgPool,
    user_id: Uuid,
    key_id: Uuid,
    update: &UpdateKeyRequest,
) -> Result<Option<ApiKeyRow>, sqlx::Error> {
    sqlx::query_as::<_, ApiKeyRow>(&format!(
        "UPDATE api_keys SET \
           name = COALESCE($3, name), \
           status = COALESCE($4, status), \
           permissions = COALESCE($5, permissions), \
           rate_limit = COALESCE($6, rate_limit), \
           updated_at = NOW() \
         WHERE id = $1 AND user_id = $2 \
         RETURNING {}",
        KEY_COLUMNS
    ))
    .bind(key_id)
    .bind(user_id)
    .bind(update.name.as_deref())
    .bind(update.status.as_deref())
    .bind(update.permissions.as_ref())
    .bind(update.rate_limit)
    .fetch_optional(pool)
    .await
}

/// Owner-scoped delete. Returns false when no row matched.
pub async fn delete_key(pool: &PgPool, user_id: Uuid, key_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND user_id = $2")
        .bind(key_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Whether `key_id` exists and belongs to `user_id`
pub async fn key_owned(pool: &PgPool, user_id: Uuid, key_id: Uuid) -> Result<bool, sqlx::Error> {
    let found: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM api_keys WHERE id = $1 AND user_id = $2")
            .bind(key_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

/// Last-30-days request log for one key, newest first, capped at 1000
pub async fn usage_rows(pool: &PgPool, key_id: Uuid) -> Result<Vec<RequestSample>, sqlx::Error> {
    sqlx::query_as::<_, RequestSample>(
        "SELECT endpoint, method, status_code, created_at \
         FROM api_requests \
         WHERE api_key_id = $1 AND created_at >= NOW() - INTERVAL '30 days' \
         ORDER BY created_at DESC \
         LIMIT 1000",
    )
    .bind(key_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    async fn seed_key(pool: &PgPool, user_id: Uuid, name: &str) -> ApiKeyRow {
        insert_key(
            pool,
            user_id,
            name,
            &keys::generate_api_key(),
            &keys::hash_secret(&keys::generate_api_secret()),
            &keys::default_permissions(),
            60,
            None,
        )
        .await
        .unwrap()
    }

    #[sqlx::test]
    async fn test_delete_is_scoped_to_owner(pool: PgPool) {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let key = seed_key(&pool, owner, "owner key").await;

        // Another user's delete matches zero rows and leaves the key intact
        assert!(!delete_key(&pool, stranger, key.id).await.unwrap());
        assert!(key_owned(&pool, owner, key.id).await.unwrap());

        assert!(delete_key(&pool, owner, key.id).await.unwrap());
        assert!(!key_owned(&pool, owner, key.id).await.unwrap());
    }

    #[sqlx::test]
    async fn test_update_is_scoped_to_owner(pool: PgPool) {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let key = seed_key(&pool, owner, "owner key").await;

        let update = UpdateKeyRequest {
            name: Some("hijacked".to_string()),
            status: None,
            permissions: None,
            rate_limit: None,
        };

        assert!(update_key(&pool, stranger, key.id, &update)
            .await
            .unwrap()
            .is_none());

        let rows = list_keys(&pool, owner).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "owner key");

        let renamed = update_key(&pool, owner, key.id, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "hijacked");
    }

    #[sqlx::test]
    async fn test_list_excludes_other_users(pool: PgPool) {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        seed_key(&pool, alice, "alice key").await;
        seed_key(&pool, bob, "bob key").await;

        let rows = list_keys(&pool, alice).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "alice key");
    }
}
