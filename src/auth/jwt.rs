/// Session token codec.
///
/// Issues and verifies the signed tokens that carry identity claims. The
/// algorithm is pinned to HS256 on both sides, so a token signed with
/// anything else (including "none") fails verification outright.
///
/// Expiry is deliberately NOT part of `decode_session_token`: callers that
/// need to distinguish "bring me a fresh token" from "this token is garbage"
/// inspect the expiry claim themselves. `validate_session_token` is the
/// all-in-one check used on authenticated requests.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, UserProfile};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// An encoded session token plus its expiry, for caller convenience.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Encode a new session token for a user.
pub fn issue_session_token(
    user: &UserProfile,
    config: &JwtSettings,
) -> Result<IssuedToken, AppError> {
    let claims = Claims::for_user(user, config.session_token_expiry, config.issuer.clone());
    issue_from_claims(&claims, config)
}

/// Encode a session token from an already-built claim set. Used on renewal,
/// where the identity comes from the expired token rather than the database.
pub fn issue_from_claims(claims: &Claims, config: &JwtSettings) -> Result<IssuedToken, AppError> {
    let token = encode(
        &Header::new(SIGNING_ALGORITHM),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(IssuedToken {
        token,
        expires_at: claims.expires_at()?,
    })
}

/// Verify signature, algorithm, and issuer; decode claims. Expiry is NOT
/// checked here. Malformed input, a bad signature, and a wrong algorithm all
/// collapse to the same failure.
pub fn decode_session_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.set_issuer(&[&config.issuer]);
    validation.validate_exp = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Session token rejected: {}", e);
        AppError::Auth(AuthError::TokenMalformed)
    })
}

/// Full validation including expiry. Used by the middleware guarding
/// authenticated routes; an expired token is reported as such so clients
/// know to refresh rather than re-login.
pub fn validate_session_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.set_issuer(&[&config.issuer]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Auth(AuthError::TokenExpired),
        _ => {
            tracing::warn!("Session token rejected: {}", e);
            AppError::Auth(AuthError::TokenMalformed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Role;
    use uuid::Uuid;

    fn test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            session_token_expiry: 1200,
            refresh_token_expiry: 604800,
            issuer: "wayfarer-test".to_string(),
        }
    }

    fn test_user() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            first_name: "Olena".to_string(),
            last_name: None,
            email: "olena@example.com".to_string(),
            phone: Some("+380501112233".to_string()),
            picture_url: None,
            role: Role::Landlord,
        }
    }

    #[test]
    fn issue_and_validate_round_trip() {
        let config = test_config();
        let user = test_user();

        let issued = issue_session_token(&user, &config).expect("Failed to issue token");
        let claims = validate_session_token(&issued.token, &config).expect("Failed to validate");

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Landlord);
        assert_eq!(claims.iss, "wayfarer-test");
        assert_eq!(claims.expires_at().unwrap(), issued.expires_at);
    }

    #[test]
    fn garbage_token_is_malformed() {
        let config = test_config();
        let result = decode_session_token("not.a.token", &config);

        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::TokenMalformed))
        ));
    }

    #[test]
    fn tampered_token_is_malformed() {
        let config = test_config();
        let issued = issue_session_token(&test_user(), &config).unwrap();

        let tampered = format!("{}X", issued.token);
        assert!(decode_session_token(&tampered, &config).is_err());
    }

    #[test]
    fn wrong_issuer_is_malformed() {
        let mut config = test_config();
        let issued = issue_session_token(&test_user(), &config).unwrap();

        config.issuer = "someone-else".to_string();
        assert!(decode_session_token(&issued.token, &config).is_err());
    }

    #[test]
    fn decode_accepts_an_expired_token() {
        let mut config = test_config();
        config.session_token_expiry = -300;
        let issued = issue_session_token(&test_user(), &config).unwrap();

        let claims = decode_session_token(&issued.token, &config)
            .expect("decode must not enforce expiry");
        assert!(claims.is_expired());
    }

    #[test]
    fn validate_rejects_an_expired_token_as_expired() {
        let mut config = test_config();
        config.session_token_expiry = -300;
        let issued = issue_session_token(&test_user(), &config).unwrap();

        let result = validate_session_token(&issued.token, &config);
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::TokenExpired))
        ));
    }

    #[test]
    fn token_signed_with_another_key_is_malformed() {
        let config = test_config();
        let issued = issue_session_token(&test_user(), &config).unwrap();

        let mut other = test_config();
        other.secret = "a-completely-different-signing-key-here".to_string();
        assert!(decode_session_token(&issued.token, &other).is_err());
    }
}
