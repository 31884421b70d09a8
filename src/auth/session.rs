/// Session lifecycle orchestration.
///
/// Owns every mutation of the refresh token store and the decision table
/// joining the two client credentials:
///
///   session token:  valid | expired | malformed
///   refresh token:  present-and-valid | expired | absent
///
/// Login rotates the refresh token (one live token per user, new login
/// invalidates the old session's refresh capability). Renewal hands back a
/// fresh session token but leaves the refresh token untouched; only login
/// rotates it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::claims::{Claims, Role, UserProfile};
use crate::auth::jwt::{decode_session_token, issue_from_claims, issue_session_token};
use crate::auth::password::verify_password;
use crate::auth::refresh_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// The token pair handed to clients. Ephemeral transport, never persisted
/// as a unit.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub session_token: String,
    pub session_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
}

/// A successful login: the authenticated profile plus its token pair.
#[derive(Debug, Serialize)]
pub struct LoginInfo {
    pub user: UserProfile,
    pub tokens: SessionTokens,
}

/// Authenticate credentials and start a fresh session.
///
/// "No such user" and "wrong password" surface the same failure so login
/// responses do not reveal which one it was. Any refresh token from an
/// earlier session is deleted before the new one is created; the UNIQUE
/// constraint on `user_id` makes concurrent logins serialize here.
pub async fn login(
    pool: &PgPool,
    config: &JwtSettings,
    email: &str,
    password: &str,
) -> Result<LoginInfo, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, first_name, last_name, email, phone, picture_url, role, password_hash
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(password, &row.password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let user = row.into_profile()?;

    refresh_token::delete_for_user(pool, user.id).await?;
    let tokens = issue_tokens_for_user(pool, config, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(LoginInfo { user, tokens })
}

/// End the user's session by removing their refresh token. Idempotent:
/// logging out a user with no live token succeeds.
pub async fn logout(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    refresh_token::delete_for_user(pool, user_id).await?;
    tracing::info!(user_id = %user_id, "User logged out");
    Ok(())
}

/// Exchange an expired-but-well-signed session token plus a live refresh
/// token for a fresh session token.
///
/// Both credentials are checked on every call; when both fail, the session
/// token's failure is the one reported. Nothing is mutated on any failure
/// path, and the refresh token value is returned unchanged on success.
pub async fn refresh_session(
    pool: &PgPool,
    config: &JwtSettings,
    session_token: &str,
    refresh_token_value: &str,
) -> Result<SessionTokens, AppError> {
    let session_check = validate_expired_session_token(pool, config, session_token).await;
    let refresh_check = validate_refresh_token(pool, refresh_token_value).await;

    // Session-token failure takes precedence over refresh-token failure.
    let claims = session_check?;
    refresh_check?;

    let renewed = claims.renewed(config.session_token_expiry);
    let issued = issue_from_claims(&renewed, config)?;

    tracing::info!(user_id = %renewed.sub, "Session renewed");

    Ok(SessionTokens {
        session_token: issued.token,
        session_token_expires_at: issued.expires_at,
        refresh_token: refresh_token_value.to_string(),
    })
}

/// Issue a session token and a refresh token for a user. Shared by login
/// and registration; assumes no live refresh token exists for the user.
pub async fn issue_tokens_for_user(
    pool: &PgPool,
    config: &JwtSettings,
    user: &UserProfile,
) -> Result<SessionTokens, AppError> {
    let issued = issue_session_token(user, config)?;
    let refresh = refresh_token::create_for_user(pool, user.id, config.refresh_token_expiry).await?;

    Ok(SessionTokens {
        session_token: issued.token,
        session_token_expires_at: issued.expires_at,
        refresh_token: refresh,
    })
}

/// A session token qualifies for renewal when it is well-signed, already
/// expired, and its subject still exists.
async fn validate_expired_session_token(
    pool: &PgPool,
    config: &JwtSettings,
    token: &str,
) -> Result<Claims, AppError> {
    let claims = decode_session_token(token, config)?;

    if claims.expires_at()? > Utc::now() {
        return Err(AppError::Auth(AuthError::TokenNotYetExpired));
    }

    let user_id = claims.user_id()?;
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::Auth(AuthError::UserNotFound));
    }

    Ok(claims)
}

async fn validate_refresh_token(pool: &PgPool, token: &str) -> Result<(), AppError> {
    let stored = refresh_token::find_by_value(pool, token)
        .await?
        .ok_or(AppError::Auth(AuthError::RefreshTokenNotFound))?;

    if stored.is_expired() {
        tracing::info!(user_id = %stored.user_id, "Refresh token expired");
        return Err(AppError::Auth(AuthError::RefreshTokenExpired));
    }

    Ok(())
}

/// User row as read for authentication and profile purposes.
#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub picture_url: Option<String>,
    pub role: String,
    pub password_hash: String,
}

impl UserRow {
    pub(crate) fn into_profile(self) -> Result<UserProfile, AppError> {
        Ok(UserProfile {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            picture_url: self.picture_url,
            role: Role::parse(&self.role)?,
        })
    }
}
