/// Apartment resource routes. Apartments belong to landlord users; listing
/// is public to any authenticated caller so travelers can browse them.

use actix_web::{web, HttpResponse};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{AppError, DatabaseError};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Apartment {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location_link: Option<String>,
    pub bathrooms_count: i32,
    pub living_rooms_count: i32,
    pub bedrooms_count: i32,
    pub guests_count: i32,
    pub children_allowed: bool,
    pub pets_allowed: bool,
    pub check_in_time: NaiveTime,
    pub check_out_time: NaiveTime,
    pub price_per_day: f64,
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateApartmentRequest {
    pub name: String,
    pub address: String,
    pub location_link: Option<String>,
    pub bathrooms_count: i32,
    pub living_rooms_count: i32,
    pub bedrooms_count: i32,
    pub guests_count: i32,
    pub children_allowed: bool,
    pub pets_allowed: bool,
    pub check_in_time: NaiveTime,
    pub check_out_time: NaiveTime,
    pub price_per_day: f64,
}

fn apartment_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound(
        "Apartment with such id was not found".to_string(),
    ))
}

/// GET /api/apartments
pub async fn list_apartments(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let apartments = sqlx::query_as::<_, Apartment>(
        r#"
        SELECT id, name, address, location_link, bathrooms_count, living_rooms_count,
               bedrooms_count, guests_count, children_allowed, pets_allowed,
               check_in_time, check_out_time, price_per_day, user_id
        FROM apartments
        ORDER BY name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(apartments))
}

/// POST /api/apartments
///
/// The new apartment is owned by the authenticated caller.
pub async fn create_apartment(
    claims: web::ReqData<Claims>,
    form: web::Json<CreateApartmentRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let apartment = sqlx::query_as::<_, Apartment>(
        r#"
        INSERT INTO apartments (id, name, address, location_link, bathrooms_count,
            living_rooms_count, bedrooms_count, guests_count, children_allowed,
            pets_allowed, check_in_time, check_out_time, price_per_day, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING id, name, address, location_link, bathrooms_count, living_rooms_count,
            bedrooms_count, guests_count, children_allowed, pets_allowed,
            check_in_time, check_out_time, price_per_day, user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&form.name)
    .bind(&form.address)
    .bind(&form.location_link)
    .bind(form.bathrooms_count)
    .bind(form.living_rooms_count)
    .bind(form.bedrooms_count)
    .bind(form.guests_count)
    .bind(form.children_allowed)
    .bind(form.pets_allowed)
    .bind(form.check_in_time)
    .bind(form.check_out_time)
    .bind(form.price_per_day)
    .bind(user_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(apartment_id = %apartment.id, user_id = %user_id, "Apartment created");
    Ok(HttpResponse::Created().json(apartment))
}

/// GET /api/apartments/{id}
pub async fn get_apartment(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let apartment = sqlx::query_as::<_, Apartment>(
        r#"
        SELECT id, name, address, location_link, bathrooms_count, living_rooms_count,
               bedrooms_count, guests_count, children_allowed, pets_allowed,
               check_in_time, check_out_time, price_per_day, user_id
        FROM apartments
        WHERE id = $1
        "#,
    )
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(apartment_not_found)?;

    Ok(HttpResponse::Ok().json(apartment))
}

/// DELETE /api/apartments/{id}
pub async fn delete_apartment(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let apartment_id = path.into_inner();

    let result = sqlx::query("DELETE FROM apartments WHERE id = $1")
        .bind(apartment_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(apartment_not_found());
    }

    tracing::info!(apartment_id = %apartment_id, "Apartment deleted");
    Ok(HttpResponse::NoContent().finish())
}
