//! Shared application state.
//!
//! # Responsibility
//! - Own the single SQLite connection and run blocking database work off the
//!   async runtime.
//! - Build short-lived services over that connection for each request.
//!
//! # Invariants
//! - The connection is only touched inside `spawn_blocking` while the mutex
//!   is held, so every request sees a consistent database.

use crate::error::ApiError;
use chrono::Duration;
use jotbox_core::{
    NoteService, ServiceError, SessionService, SqliteNoteRepository, SqliteSessionRepository,
    SqliteUserRepository, UserId,
};
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use std::sync::{Arc, Mutex};
use tower_cookies::Key;

/// Session gate bound to one borrowed connection.
pub type SessionGate<'conn> =
    SessionService<SqliteUserRepository<'conn>, SqliteSessionRepository<'conn>>;

/// Note service bound to one borrowed connection.
pub type Notes<'conn> = NoteService<SqliteNoteRepository<'conn>>;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against the connection on the blocking thread pool.
    pub async fn call<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, ServiceError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| ApiError::Internal("database mutex poisoned".to_string()))?;
            f(&mut guard).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("database task failed: {err}")))?
    }
}

#[derive(Clone)]
pub struct AppState {
    db: Database,
    cookie_key: Key,
    session_ttl: Duration,
}

impl AppState {
    /// Builds state over a migrated connection. The cookie signing key is
    /// the SHA-512 digest of `secret_key`.
    pub fn new(conn: Connection, secret_key: &str, session_ttl: Duration) -> Self {
        let digest = Sha512::digest(secret_key.as_bytes());
        Self {
            db: Database::new(conn),
            cookie_key: Key::from(digest.as_slice()),
            session_ttl,
        }
    }

    pub fn cookie_key(&self) -> &Key {
        &self.cookie_key
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn with_sessions<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&SessionGate<'conn>) -> Result<T, ServiceError> + Send + 'static,
    {
        let ttl = self.session_ttl;
        self.db
            .call(move |conn| {
                let gate = SessionService::new(
                    SqliteUserRepository::try_new(conn)?,
                    SqliteSessionRepository::try_new(conn)?,
                    ttl,
                );
                f(&gate)
            })
            .await
    }

    pub async fn with_notes<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&mut Notes<'conn>) -> Result<T, ServiceError> + Send + 'static,
    {
        self.db
            .call(move |conn| {
                let mut notes = NoteService::new(SqliteNoteRepository::try_new(conn)?);
                f(&mut notes)
            })
            .await
    }

    /// Resolves a presented session token to its user, sliding the expiry.
    pub async fn require_session(&self, token: Option<String>) -> Result<UserId, ApiError> {
        self.with_sessions(move |gate| gate.require_session(token.as_deref()))
            .await
    }
}
