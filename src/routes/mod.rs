mod apartments;
mod auth;
mod bookings;
mod health_check;
mod trips;
pub(crate) mod users;

pub use apartments::{create_apartment, delete_apartment, get_apartment, list_apartments};
pub use auth::{get_current_user, login, logout, refresh, register};
pub use bookings::{create_booking, delete_booking, get_booking, list_bookings_for_trip};
pub use health_check::health_check;
pub use trips::{create_trip, delete_trip, get_trip, list_trips, update_trip};
pub use users::{delete_user, get_user, list_users, update_user};
