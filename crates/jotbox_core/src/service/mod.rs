//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Map persistence outcomes onto the caller-facing error taxonomy.
//! - Keep HTTP and other outer layers decoupled from storage details.
//!
//! # Invariants
//! - "Not found" and "owned by someone else" surface as the same
//!   `ServiceError::NotFound`.
//! - Services never log plaintext passwords, hashes or session tokens.

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account_service;
pub mod note_service;
pub mod session_service;

/// Caller-facing error for every use-case service.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before touching storage.
    Validation(ValidationError),
    /// Bad credentials, or no live session.
    Unauthorized,
    /// Uniqueness rule violated (e.g. email already registered).
    Conflict(String),
    /// Target absent or not owned by the caller.
    NotFound,
    /// Password hashing backend failure.
    Credential(String),
    /// Storage failure; any open transaction has been rolled back.
    Persistence(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unauthorized => write!(f, "authentication required"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::NotFound => write!(f, "not found"),
            Self::Credential(message) => write!(f, "credential backend failure: {message}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteNotFound(_) | RepoError::UserNotFound(_) => Self::NotFound,
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Persistence(other),
        }
    }
}
