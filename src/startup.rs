use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::JwtSettings;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_apartment, create_booking, create_trip, delete_apartment, delete_booking, delete_trip,
    delete_user, get_apartment, get_booking, get_current_user, get_trip, get_user, health_check,
    list_apartments, list_bookings_for_trip, list_trips, list_users, login, logout, refresh,
    register, update_trip, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())

            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))

            // Everything under /api requires a valid session token
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route("/logout", web::post().to(logout))
                    .route("/me", web::get().to(get_current_user))
                    .route("/users", web::get().to(list_users))
                    .route("/users/{id}", web::get().to(get_user))
                    .route("/users/{id}", web::put().to(update_user))
                    .route("/users/{id}", web::delete().to(delete_user))
                    .route("/trips", web::get().to(list_trips))
                    .route("/trips", web::post().to(create_trip))
                    .route("/trips/{id}", web::get().to(get_trip))
                    .route("/trips/{id}", web::put().to(update_trip))
                    .route("/trips/{id}", web::delete().to(delete_trip))
                    .route("/trips/{trip_id}/bookings", web::get().to(list_bookings_for_trip))
                    .route("/apartments", web::get().to(list_apartments))
                    .route("/apartments", web::post().to(create_apartment))
                    .route("/apartments/{id}", web::get().to(get_apartment))
                    .route("/apartments/{id}", web::delete().to(delete_apartment))
                    .route("/bookings", web::post().to(create_booking))
                    .route("/bookings/{id}", web::get().to(get_booking))
                    .route("/bookings/{id}", web::delete().to(delete_booking)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
