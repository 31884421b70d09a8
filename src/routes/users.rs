/// User resource routes. Plain repository pass-throughs over the users
/// table; the interesting auth paths live in `routes::auth`.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, Role, UserProfile};
use crate::error::{AppError, DatabaseError};
use crate::validators::{is_valid_email, is_valid_name, is_valid_phone};

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    first_name: String,
    last_name: Option<String>,
    email: String,
    phone: Option<String>,
    picture_url: Option<String>,
    role: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<UserProfile, AppError> {
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

pub(crate) async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, AppError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, first_name, last_name, email, phone, picture_url, role FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::Database(DatabaseError::NotFound(
            "User with such id was not found".to_string(),
        ))
    })?;

    row.into_profile()
}

/// GET /api/users
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let rows = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, first_name, last_name, email, phone, picture_url, role FROM users ORDER BY created_at",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let users = rows
        .into_iter()
        .map(ProfileRow::into_profile)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/users/{id}
pub async fn get_user(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user = fetch_profile(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub picture_url: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

/// PUT /api/users/{id}
///
/// Partial update: absent fields keep their stored values. A new password
/// is re-hashed before storage.
pub async fn update_user(
    path: web::Path<Uuid>,
    form: web::Json<UpdateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let email = form.email.as_deref().map(is_valid_email).transpose()?;
    let first_name = form.first_name.as_deref().map(is_valid_name).transpose()?;
    let last_name = form.last_name.as_deref().map(is_valid_name).transpose()?;
    let phone = form.phone.as_deref().map(is_valid_phone).transpose()?;
    let password_hash = form
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            phone = COALESCE($5, phone),
            picture_url = COALESCE($6, picture_url),
            role = COALESCE($7, role),
            password_hash = COALESCE($8, password_hash),
            updated_at = $9
        WHERE id = $1
        RETURNING id, first_name, last_name, email, phone, picture_url, role
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(phone)
    .bind(&form.picture_url)
    .bind(form.role.map(|r| r.as_str()))
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| {
        AppError::Database(DatabaseError::NotFound(
            "User with such id was not found".to_string(),
        ))
    })?;

    let user = row.into_profile()?;
    tracing::info!(user_id = %user.id, "User profile updated");

    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /api/users/{id}
///
/// Removes the user; trips, bookings, and any refresh token go with it via
/// ON DELETE CASCADE.
pub async fn delete_user(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(
            "User with such id was not found".to_string(),
        )));
    }

    tracing::info!(user_id = %user_id, "User deleted");
    Ok(HttpResponse::NoContent().finish())
}
