/// Authentication routes: registration, login, logout, session renewal, and
/// the current-user endpoint. Thin wrappers: credential and token decisions
/// live in `crate::auth`, handlers only translate HTTP shapes.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, Claims, Role, UserProfile};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::validators::{is_valid_email, is_valid_name, is_valid_phone};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub picture_url: Option<String>,
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub session_token: String,
    pub refresh_token: String,
}

/// POST /auth/register
///
/// Create a user and start their first session. Duplicate emails surface as
/// 409 via the unique constraint on `users.email`.
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let first_name = is_valid_name(&form.first_name)?;
    let last_name = form
        .last_name
        .as_deref()
        .map(is_valid_name)
        .transpose()?;
    let phone = form.phone.as_deref().map(is_valid_phone).transpose()?;
    let password_hash = auth::hash_password(&form.password)?;
    let role = form.role.unwrap_or(Role::Traveler);

    let user_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, first_name, last_name, phone, picture_url, password_hash, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&first_name)
    .bind(&last_name)
    .bind(&phone)
    .bind(&form.picture_url)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(Utc::now())
    .bind(Utc::now())
    .execute(pool.get_ref())
    .await?;

    let user = UserProfile {
        id: user_id,
        first_name,
        last_name,
        email,
        phone,
        picture_url: form.picture_url.clone(),
        role,
    };
    let tokens = auth::issue_tokens_for_user(pool.get_ref(), jwt_config.get_ref(), &user).await?;

    tracing::info!(user_id = %user_id, "User registered");

    Ok(HttpResponse::Created().json(auth::LoginInfo { user, tokens }))
}

/// POST /auth/login
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let info = auth::login(pool.get_ref(), jwt_config.get_ref(), &email, &form.password).await?;

    Ok(HttpResponse::Ok().json(info))
}

/// POST /auth/refresh
///
/// Exchange an expired session token plus its refresh token for a fresh
/// session token. The refresh token itself is not rotated here.
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let tokens = auth::refresh_session(
        pool.get_ref(),
        jwt_config.get_ref(),
        &form.session_token,
        &form.refresh_token,
    )
    .await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /api/logout
///
/// Requires a valid session token; removes the caller's refresh token.
/// Succeeds even when no refresh token exists.
pub async fn logout(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    auth::logout(pool.get_ref(), user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/me
///
/// The caller's profile, read back from the database rather than echoed
/// from the token so recent profile edits show up.
pub async fn get_current_user(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let user = crate::routes::users::fetch_profile(pool.get_ref(), user_id).await?;

    Ok(HttpResponse::Ok().json(user))
}
