/// Password hashing and verification on top of bcrypt.
///
/// The bcrypt string embeds its own salt, so storage needs a single column
/// and verification needs no separate salt handling.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Hash a password after checking strength requirements.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Minimum 8 characters, maximum 128 (bcrypt truncates beyond 72 bytes and
/// unbounded input invites abuse), at least one digit, one lowercase, one
/// uppercase.
fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_differs_from_plaintext_and_verifies() {
        let password = "P@ss1234word";
        let hashed = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hashed);
        assert!(hashed.starts_with("$2"));
        assert!(verify_password(password, &hashed).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hashed = hash_password("P@ss1234word").unwrap();
        assert!(!verify_password("Wrong1234word", &hashed).unwrap());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        let too_long = format!("{}A1", "a".repeat(MAX_PASSWORD_LENGTH));
        let cases = [
            "Short1",           // too short
            "nouppercase1",     // no uppercase
            "NOLOWERCASE1",     // no lowercase
            "NoDigitsHere",     // no digit
            too_long.as_str(),  // too long
        ];

        for weak in cases {
            assert!(hash_password(weak).is_err(), "accepted: {}", weak);
        }
    }
}
