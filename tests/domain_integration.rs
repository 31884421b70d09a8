use std::net::TcpListener;

use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use wayfarer::configuration::{get_configuration, DatabaseSettings};
use wayfarer::startup::run;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(listener, connection_pool.clone(), configuration.jwt.clone())
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

/// Register a user and return their session token.
async fn authenticated_token(app: &TestApp, email: &str) -> String {
    let body = json!({
        "email": email,
        "password": "SecurePass123",
        "first_name": "Marta"
    });

    let response: Value = reqwest::Client::new()
        .post(&format!("{}/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");

    response["tokens"]["session_token"]
        .as_str()
        .expect("No session token in response")
        .to_string()
}

async fn create_trip(app: &TestApp, token: &str, name: &str) -> Value {
    let response = reqwest::Client::new()
        .post(&format!("{}/api/trips", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "start_date": "2026-09-01T00:00:00Z",
            "end_date": "2026-09-14T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    response.json().await.expect("Failed to parse response")
}

async fn create_apartment(app: &TestApp, token: &str, name: &str) -> Value {
    let response = reqwest::Client::new()
        .post(&format!("{}/api/apartments", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "address": "12 Harbour Lane",
            "location_link": null,
            "bathrooms_count": 1,
            "living_rooms_count": 1,
            "bedrooms_count": 2,
            "guests_count": 4,
            "children_allowed": true,
            "pets_allowed": false,
            "check_in_time": "15:00:00",
            "check_out_time": "11:00:00",
            "price_per_day": 85.0
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    response.json().await.expect("Failed to parse response")
}

// --- Trips ---

#[tokio::test]
async fn trip_crud_round_trip() {
    let app = spawn_app().await;
    let token = authenticated_token(&app, "marta@example.com").await;
    let client = reqwest::Client::new();

    let trip = create_trip(&app, &token, "Lisbon in September").await;
    let trip_id = trip["id"].as_str().unwrap();
    assert_eq!(trip["finished"], false);

    // Listed for its owner
    let listed: Value = client
        .get(&format!("{}/api/trips", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Lisbon in September");

    // Partial update
    let updated: Value = client
        .put(&format!("{}/api/trips/{}", &app.address, trip_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"finished": true}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["finished"], true);
    assert_eq!(updated["name"], "Lisbon in September");

    // Delete
    let response = client
        .delete(&format!("{}/api/trips/{}", &app.address, trip_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = client
        .get(&format!("{}/api/trips/{}", &app.address, trip_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn trips_are_listed_per_owner() {
    let app = spawn_app().await;
    let marta = authenticated_token(&app, "marta@example.com").await;
    let olena = authenticated_token(&app, "olena@example.com").await;
    let client = reqwest::Client::new();

    create_trip(&app, &marta, "Lisbon in September").await;
    create_trip(&app, &olena, "Kyiv weekend").await;

    let listed: Value = client
        .get(&format!("{}/api/trips", &app.address))
        .header("Authorization", format!("Bearer {}", marta))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let trips = listed.as_array().unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0]["name"], "Lisbon in September");
}

#[tokio::test]
async fn trip_routes_require_authentication() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(&format!("{}/api/trips", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Apartments ---

#[tokio::test]
async fn apartment_create_get_delete() {
    let app = spawn_app().await;
    let token = authenticated_token(&app, "olena@example.com").await;
    let client = reqwest::Client::new();

    let apartment = create_apartment(&app, &token, "Old Town Loft").await;
    let apartment_id = apartment["id"].as_str().unwrap();
    assert_eq!(apartment["guests_count"], 4);

    let fetched: Value = client
        .get(&format!("{}/api/apartments/{}", &app.address, apartment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Old Town Loft");
    assert_eq!(fetched["price_per_day"], 85.0);

    let response = client
        .delete(&format!("{}/api/apartments/{}", &app.address, apartment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());
}

// --- Bookings ---

#[tokio::test]
async fn booking_ties_a_trip_to_an_apartment() {
    let app = spawn_app().await;
    let token = authenticated_token(&app, "marta@example.com").await;
    let client = reqwest::Client::new();

    let trip = create_trip(&app, &token, "Lisbon in September").await;
    let apartment = create_apartment(&app, &token, "Old Town Loft").await;
    let trip_id = trip["id"].as_str().unwrap();

    let response = client
        .post(&format!("{}/api/bookings", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "start_visit_date": "2026-09-02T00:00:00Z",
            "end_visit_date": "2026-09-06T00:00:00Z",
            "trip_id": trip_id,
            "apartment_id": apartment["id"].as_str().unwrap()
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let listed: Value = client
        .get(&format!("{}/api/trips/{}/bookings", &app.address, trip_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn booking_with_unknown_trip_returns_404() {
    let app = spawn_app().await;
    let token = authenticated_token(&app, "marta@example.com").await;

    let apartment = create_apartment(&app, &token, "Old Town Loft").await;

    let response = reqwest::Client::new()
        .post(&format!("{}/api/bookings", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "start_visit_date": "2026-09-02T00:00:00Z",
            "end_visit_date": "2026-09-06T00:00:00Z",
            "trip_id": Uuid::new_v4(),
            "apartment_id": apartment["id"].as_str().unwrap()
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

// --- Users ---

#[tokio::test]
async fn deleting_a_user_cascades_their_refresh_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let body = json!({
        "email": "marta@example.com",
        "password": "SecurePass123",
        "first_name": "Marta"
    });
    let registered: Value = client
        .post(&format!("{}/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = registered["user"]["id"].as_str().unwrap();
    let token = registered["tokens"]["session_token"].as_str().unwrap();

    let response = client
        .delete(&format!("{}/api/users/{}", &app.address, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM refresh_tokens")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn updating_a_password_allows_login_with_the_new_one() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let body = json!({
        "email": "marta@example.com",
        "password": "SecurePass123",
        "first_name": "Marta"
    });
    let registered: Value = client
        .post(&format!("{}/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = registered["user"]["id"].as_str().unwrap();
    let token = registered["tokens"]["session_token"].as_str().unwrap();

    let response = client
        .put(&format!("{}/api/users/{}", &app.address, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"password": "FreshPass456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let login = client
        .post(&format!("{}/auth/login", &app.address))
        .json(&json!({"email": "marta@example.com", "password": "FreshPass456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(200, login.status().as_u16());

    let stale_login = client
        .post(&format!("{}/auth/login", &app.address))
        .json(&json!({"email": "marta@example.com", "password": "SecurePass123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(401, stale_login.status().as_u16());
}
