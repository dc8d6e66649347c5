//! User account model.
//!
//! # Responsibility
//! - Define the persisted account record.
//! - Normalize and validate registration credentials.
//!
//! # Invariants
//! - `email` is always stored trimmed and lowercased.
//! - `password_hash` is a PHC string; plaintext never reaches this type.
//! - `Debug` output never includes the password hash.

use crate::model::validation::ValidationError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::{Debug, Formatter};

/// Stable identifier of a user account.
pub type UserId = i64;

/// Minimum accepted password length, counted in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Persisted account record.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    /// Login key, normalized.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Trims and lowercases an email so it can be used as a lookup key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Returns whether `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validates registration input. `email` must already be normalized.
pub fn validate_registration(email: &str, password: &str) -> Result<(), ValidationError> {
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort {
            min_chars: MIN_PASSWORD_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, normalize_email, validate_registration, User};
    use crate::model::validation::ValidationError;
    use chrono::Utc;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM \n"), "alice@example.com");
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b.c"));
    }

    #[test]
    fn short_password_is_rejected() {
        let err = validate_registration("a@b.com", "12345").unwrap_err();
        assert_eq!(err, ValidationError::PasswordTooShort { min_chars: 6 });
        assert!(validate_registration("a@b.com", "123456").is_ok());
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        assert!(validate_registration("a@b.com", "ééééé").is_err());
        assert!(validate_registration("a@b.com", "éééééé").is_ok());
    }

    #[test]
    fn debug_output_redacts_password_hash() {
        let user = User {
            id: 7,
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("argon2id"));
        assert!(rendered.contains("<redacted>"));
    }
}
