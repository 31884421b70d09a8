/// Authentication and session management.
///
/// `jwt` + `claims` form the token codec, `refresh_token` is the durable
/// store, and `session` orchestrates login, logout, and renewal on top of
/// both.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::{Claims, Role, UserProfile};
pub use jwt::{issue_session_token, validate_session_token, IssuedToken};
pub use password::{hash_password, verify_password};
pub use refresh_token::{find_by_user, find_by_value, StoredRefreshToken};
pub use session::{login, logout, refresh_session, issue_tokens_for_user, LoginInfo, SessionTokens};
