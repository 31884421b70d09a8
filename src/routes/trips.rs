/// Trip resource routes. Listing is scoped to the authenticated caller;
/// everything else is keyed by trip id.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{AppError, DatabaseError};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub finished: bool,
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateTripRequest {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct UpdateTripRequest {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub finished: Option<bool>,
}

fn trip_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound(
        "Trip with such id was not found".to_string(),
    ))
}

/// GET /api/trips
///
/// Lists the authenticated caller's trips.
pub async fn list_trips(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let trips = sqlx::query_as::<_, Trip>(
        "SELECT id, name, start_date, end_date, finished, user_id FROM trips WHERE user_id = $1 ORDER BY start_date",
    )
    .bind(user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(trips))
}

/// POST /api/trips
pub async fn create_trip(
    claims: web::ReqData<Claims>,
    form: web::Json<CreateTripRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let trip = sqlx::query_as::<_, Trip>(
        r#"
        INSERT INTO trips (id, name, start_date, end_date, finished, user_id)
        VALUES ($1, $2, $3, $4, false, $5)
        RETURNING id, name, start_date, end_date, finished, user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&form.name)
    .bind(form.start_date)
    .bind(form.end_date)
    .bind(user_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(trip_id = %trip.id, user_id = %user_id, "Trip created");
    Ok(HttpResponse::Created().json(trip))
}

/// GET /api/trips/{id}
pub async fn get_trip(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let trip = sqlx::query_as::<_, Trip>(
        "SELECT id, name, start_date, end_date, finished, user_id FROM trips WHERE id = $1",
    )
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(trip_not_found)?;

    Ok(HttpResponse::Ok().json(trip))
}

/// PUT /api/trips/{id}
pub async fn update_trip(
    path: web::Path<Uuid>,
    form: web::Json<UpdateTripRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let trip = sqlx::query_as::<_, Trip>(
        r#"
        UPDATE trips
        SET name = COALESCE($2, name),
            start_date = COALESCE($3, start_date),
            end_date = COALESCE($4, end_date),
            finished = COALESCE($5, finished)
        WHERE id = $1
        RETURNING id, name, start_date, end_date, finished, user_id
        "#,
    )
    .bind(path.into_inner())
    .bind(&form.name)
    .bind(form.start_date)
    .bind(form.end_date)
    .bind(form.finished)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(trip_not_found)?;

    Ok(HttpResponse::Ok().json(trip))
}

/// DELETE /api/trips/{id}
pub async fn delete_trip(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let trip_id = path.into_inner();

    let result = sqlx::query("DELETE FROM trips WHERE id = $1")
        .bind(trip_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(trip_not_found());
    }

    tracing::info!(trip_id = %trip_id, "Trip deleted");
    Ok(HttpResponse::NoContent().finish())
}
