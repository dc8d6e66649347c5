//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist and look up account records by id or normalized email.
//! - Translate email uniqueness violations into `RepoError::Conflict`.
//!
//! # Invariants
//! - Email lookup is an exact match; normalization happens before this layer.
//! - Deleting a user cascades to notes and sessions through foreign keys.

use crate::model::user::{User, UserId};
use crate::repo::{ensure_tables, from_micros, is_unique_violation, to_micros, RepoError, RepoResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, email, password_hash, created_at FROM users";

/// Repository interface for account records.
pub trait UserRepository {
    /// Inserts a new account and returns the stored record.
    fn insert_user(&self, email: &str, password_hash: &str) -> RepoResult<User>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Removes an account together with everything it owns.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, email: &str, password_hash: &str) -> RepoResult<User> {
        let created_at = to_micros(Utc::now());
        let inserted = self.conn.execute(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3);",
            params![email, password_hash, created_at],
        );

        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::Conflict("email already registered".to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted user {id} not found in read-back"))
        })
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
                [email],
                raw_user_row,
            )
            .optional()?;
        row.map(RawUser::into_user).transpose()
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                raw_user_row,
            )
            .optional()?;
        row.map(RawUser::into_user).transpose()
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }
        Ok(())
    }
}

struct RawUser {
    id: UserId,
    email: String,
    password_hash: String,
    created_at: i64,
}

impl RawUser {
    fn into_user(self) -> RepoResult<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            created_at: from_micros(self.created_at, "users.created_at")?,
        })
    }
}

fn raw_user_row(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}
