//! Account (credential store) use-case service.
//!
//! # Responsibility
//! - Register accounts with normalized email and hashed password.
//! - Verify email/password pairs without revealing which factor failed.
//!
//! # Invariants
//! - Emails are trimmed and lowercased before validation, lookup and insert.
//! - `verify` returns `Ok(None)` for both unknown email and wrong password.

use crate::auth::password::{hash_password, verify_password};
use crate::model::user::{normalize_email, validate_registration, User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::service::ServiceError;
use log::{info, warn};

const EMAIL_TAKEN_MESSAGE: &str = "Email already registered";

/// Account service facade over user repository implementations.
pub struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// - `Validation` for a malformed email or a short password.
    /// - `Conflict` when the normalized email is already registered.
    pub fn register(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        validate_registration(&email, password)?;

        if self.repo.find_by_email(&email)?.is_some() {
            info!("event=user_register module=accounts status=rejected reason=email_taken");
            return Err(ServiceError::Conflict(EMAIL_TAKEN_MESSAGE.to_string()));
        }

        let password_hash = hash_password(password).map_err(ServiceError::Credential)?;
        let user = self
            .repo
            .insert_user(&email, &password_hash)
            .map_err(|err| match ServiceError::from(err) {
                // Lost a race with a concurrent registration.
                ServiceError::Conflict(_) => ServiceError::Conflict(EMAIL_TAKEN_MESSAGE.to_string()),
                other => other,
            })?;

        info!(
            "event=user_register module=accounts status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Checks an email/password pair and returns the matching account.
    pub fn verify(&self, email: &str, password: &str) -> Result<Option<User>, ServiceError> {
        let email = normalize_email(email);
        let Some(user) = self.repo.find_by_email(&email)? else {
            return Ok(None);
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(err) => {
                warn!(
                    "event=user_verify module=accounts status=error user_id={} error_code=bad_stored_hash error={err}",
                    user.id
                );
                Ok(None)
            }
        }
    }

    /// Gets one account by id.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.get_user(id)?)
    }

    /// Deletes an account together with its notes and sessions.
    pub fn delete_account(&self, id: UserId) -> Result<(), ServiceError> {
        self.repo.delete_user(id)?;
        info!("event=user_delete module=accounts status=ok user_id={id}");
        Ok(())
    }
}
