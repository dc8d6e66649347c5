//! Session repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist session tokens bound to one user.
//! - Resolve live tokens with sliding expiry.
//!
//! # Invariants
//! - An expired session never resolves, even before it is purged.
//! - Deleting a session is idempotent.

use crate::model::session::Session;
use crate::model::user::UserId;
use crate::repo::{ensure_tables, from_micros, to_micros, RepoResult};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for authenticated sessions.
pub trait SessionRepository {
    fn insert_session(&self, session: &Session) -> RepoResult<()>;
    /// Returns the live session for `token` and pushes its expiry to `now + ttl`.
    fn touch_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> RepoResult<Option<Session>>;
    /// Deletes the session. Returns whether a row was removed.
    fn delete_session(&self, token: &str) -> RepoResult<bool>;
    /// Deletes every session expired at `now`. Returns the number removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<usize>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["sessions"])?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn insert_session(&self, session: &Session) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                session.token.as_str(),
                session.user_id,
                to_micros(session.created_at),
                to_micros(session.expires_at),
            ],
        )?;
        Ok(())
    }

    fn touch_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> RepoResult<Option<Session>> {
        let row = self
            .conn
            .query_row(
                "UPDATE sessions
                 SET expires_at = ?3
                 WHERE token = ?1
                   AND expires_at > ?2
                 RETURNING token, user_id, created_at, expires_at;",
                params![token, to_micros(now), to_micros(now + ttl)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, UserId>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((token, user_id, created_at, expires_at)) = row else {
            return Ok(None);
        };
        Ok(Some(Session {
            token,
            user_id,
            created_at: from_micros(created_at, "sessions.created_at")?,
            expires_at: from_micros(expires_at, "sessions.expires_at")?,
        }))
    }

    fn delete_session(&self, token: &str) -> RepoResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1;", [token])?;
        Ok(removed > 0)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1;",
            [to_micros(now)],
        )?;
        Ok(removed)
    }
}
