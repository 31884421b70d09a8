/// Booking resource routes. A booking ties a trip to an apartment for a
/// visit date range. No availability or pricing rules here, just the rows.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub start_visit_date: DateTime<Utc>,
    pub end_visit_date: DateTime<Utc>,
    pub trip_id: Uuid,
    pub apartment_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub start_visit_date: DateTime<Utc>,
    pub end_visit_date: DateTime<Utc>,
    pub trip_id: Uuid,
    pub apartment_id: Uuid,
}

fn booking_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound(
        "Booking with such id was not found".to_string(),
    ))
}

/// GET /api/trips/{trip_id}/bookings
pub async fn list_bookings_for_trip(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT id, start_visit_date, end_visit_date, trip_id, apartment_id
        FROM bookings
        WHERE trip_id = $1
        ORDER BY start_visit_date
        "#,
    )
    .bind(path.into_inner())
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(bookings))
}

/// POST /api/bookings
///
/// Unknown trip or apartment ids fail the foreign key checks and surface
/// as 404.
pub async fn create_booking(
    form: web::Json<CreateBookingRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (id, start_visit_date, end_visit_date, trip_id, apartment_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, start_visit_date, end_visit_date, trip_id, apartment_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(form.start_visit_date)
    .bind(form.end_visit_date)
    .bind(form.trip_id)
    .bind(form.apartment_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(booking_id = %booking.id, trip_id = %booking.trip_id, "Booking created");
    Ok(HttpResponse::Created().json(booking))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        SELECT id, start_visit_date, end_visit_date, trip_id, apartment_id
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(booking_not_found)?;

    Ok(HttpResponse::Ok().json(booking))
}

/// DELETE /api/bookings/{id}
pub async fn delete_booking(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();

    let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(booking_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(booking_not_found());
    }

    tracing::info!(booking_id = %booking_id, "Booking deleted");
    Ok(HttpResponse::NoContent().finish())
}
