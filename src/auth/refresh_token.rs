/// Refresh token store.
///
/// Durable, opaque credentials with a single-token-per-user lifecycle:
/// - values are 64-character random strings from a CSPRNG
/// - only the SHA-256 hash is persisted; the plaintext exists server-side
///   exactly once, in the response that hands it to the client
/// - the `user_id` column carries a UNIQUE constraint, so two concurrent
///   creates for one user cannot both land
///
/// Rotation policy lives in the session layer. `create_for_user` does not
/// delete a prior token; callers that rotate must delete first.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

const TOKEN_LENGTH: usize = 64;

/// A persisted refresh token row. The plaintext value is never stored, so
/// this struct only ever carries the hash.
#[derive(Debug, Clone)]
pub struct StoredRefreshToken {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl StoredRefreshToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Generate a new opaque refresh token value.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Persist a fresh refresh token for a user and return its plaintext value.
///
/// Fails on the unique constraint if a token for this user already exists;
/// rotation (delete first) is the caller's responsibility.
pub async fn create_for_user(
    pool: &PgPool,
    user_id: Uuid,
    expiry_seconds: i64,
) -> Result<String, AppError> {
    let token = generate_refresh_token();
    let expires_at = Utc::now() + Duration::seconds(expiry_seconds);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token_hash, user_id, expires_at, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    tracing::debug!(user_id = %user_id, "Refresh token created");
    Ok(token)
}

/// The live token for a user, if any.
pub async fn find_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<StoredRefreshToken>, AppError> {
    let row = sqlx::query_as::<_, (String, Uuid, DateTime<Utc>)>(
        r#"
        SELECT token_hash, user_id, expires_at
        FROM refresh_tokens
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(token_hash, user_id, expires_at)| StoredRefreshToken {
        token_hash,
        user_id,
        expires_at,
    }))
}

/// Look up a token by the plaintext value a client presented.
pub async fn find_by_value(
    pool: &PgPool,
    token: &str,
) -> Result<Option<StoredRefreshToken>, AppError> {
    let row = sqlx::query_as::<_, (String, Uuid, DateTime<Utc>)>(
        r#"
        SELECT token_hash, user_id, expires_at
        FROM refresh_tokens
        WHERE token_hash = $1
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(token_hash, user_id, expires_at)| StoredRefreshToken {
        token_hash,
        user_id,
        expires_at,
    }))
}

/// Remove the user's refresh token. Idempotent: deleting when none exists
/// is a no-op, not an error.
pub async fn delete_for_user(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::debug!(user_id = %user_id, "Refresh token deleted");
    }
    Ok(())
}
