//! Core domain logic for Jotbox.
//! This crate is the single source of truth for account, session and note
//! invariants; outer layers only translate requests into these calls.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteDraft, NoteId};
pub use model::session::Session;
pub use model::user::{User, UserId};
pub use model::validation::ValidationError;
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::session_repo::{SessionRepository, SqliteSessionRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::AccountService;
pub use service::note_service::NoteService;
pub use service::session_service::{SessionService, DEFAULT_SESSION_TTL_HOURS};
pub use service::ServiceError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
