/// Session token claims.
///
/// The claim set is the full identity a client needs to render the logged-in
/// user, so a verified token answers "who is this caller" without a database
/// round trip.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Traveler,
    Landlord,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Traveler => "traveler",
            Role::Landlord => "landlord",
        }
    }

    /// Parses the database representation. Unknown values are a data defect,
    /// not a client error.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "traveler" => Ok(Role::Traveler),
            "landlord" => Ok(Role::Landlord),
            other => Err(AppError::Internal(format!("unknown role: {}", other))),
        }
    }
}

/// The identity attributes embedded in a session token, as a typed profile.
/// Also the shape returned to clients by login and the user endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub picture_url: Option<String>,
    pub role: Role,
}

/// Claim set carried by session tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub picture_url: Option<String>,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn for_user(user: &UserProfile, expiry_seconds: i64, issuer: String) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            picture_url: user.picture_url.clone(),
            role: user.role,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Same identity, fresh issue and expiry timestamps. Used when a session
    /// is renewed from an expired but well-signed token.
    pub fn renewed(&self, expiry_seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            exp: now + expiry_seconds,
            iat: now,
            ..self.clone()
        }
    }

    /// Extract user ID from claims
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Auth(AuthError::TokenMalformed))
    }

    /// Expiry claim as a timestamp.
    ///
    /// Tokens we issue always carry a representable expiry, so an
    /// out-of-range value is a defect rather than a client error.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, AppError> {
        Utc.timestamp_opt(self.exp, 0).single().ok_or_else(|| {
            AppError::Internal("expiry claim is missing or out of range".to_string())
        })
    }

    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }

    /// The profile encoded in this token.
    pub fn profile(&self) -> Result<UserProfile, AppError> {
        Ok(UserProfile {
            id: self.user_id()?,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            picture_url: self.picture_url.clone(),
            role: self.role,
        })
    }
}
