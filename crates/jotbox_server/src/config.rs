//! Command-line and environment configuration for the server binary.
//!
//! Every flag has an environment fallback so the binary can run unchanged
//! under a process manager or a container.

use clap::Parser;
use jotbox_core::db::{open_db, open_db_in_memory, DbResult};
use jotbox_core::{default_log_level, DEFAULT_SESSION_TTL_HOURS};
use rusqlite::Connection;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

/// Minimum accepted length of `SECRET_KEY`, in characters.
pub const MIN_SECRET_KEY_CHARS: usize = 32;

/// Jotbox note-taking server
#[derive(Parser, Debug)]
#[command(name = "jotbox")]
#[command(about = "Jotbox: multi-user note-taking backend")]
#[command(version)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 5000, env = "PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// SQLite location: `sqlite://path`, a plain path, or `:memory:`
    #[arg(long, env = "DATABASE_URL", value_parser = parse_database_url)]
    pub database_url: DatabaseLocation,

    /// Secret used to sign session cookies (at least 32 characters)
    #[arg(long, env = "SECRET_KEY", value_parser = parse_secret_key, hide_env_values = true)]
    pub secret_key: SecretKey,

    /// Idle lifetime of a session, in hours
    #[arg(
        long,
        default_value_t = DEFAULT_SESSION_TTL_HOURS,
        env = "SESSION_TTL_HOURS",
        value_parser = clap::value_parser!(i64).range(1..=24 * 365)
    )]
    pub session_ttl_hours: i64,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, default_value = default_log_level(), env = "LOG_LEVEL")]
    pub log_level: String,

    /// Absolute directory for rolling log files; stderr only when unset
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<String>,
}

impl ServeArgs {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Opens the database and applies pending migrations.
    pub fn open(&self) -> DbResult<Connection> {
        match self {
            Self::Memory => open_db_in_memory(),
            Self::File(path) => open_db(path),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Memory => ":memory:".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Parses `sqlite://path`, `sqlite:path`, a plain path, or `:memory:`.
pub fn parse_database_url(raw: &str) -> Result<DatabaseLocation, String> {
    let trimmed = raw.trim();
    let path = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);

    if path.is_empty() {
        return Err("database url cannot be empty".to_string());
    }
    if path == ":memory:" {
        return Ok(DatabaseLocation::Memory);
    }
    if trimmed.contains("://") && !trimmed.starts_with("sqlite://") {
        return Err(format!("unsupported database url `{trimmed}`; expected sqlite"));
    }
    Ok(DatabaseLocation::File(PathBuf::from(path)))
}

/// Cookie-signing secret. `Debug` never prints the value.
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

pub fn parse_secret_key(raw: &str) -> Result<SecretKey, String> {
    let chars = raw.chars().count();
    if chars < MIN_SECRET_KEY_CHARS {
        return Err(format!(
            "secret key must be at least {MIN_SECRET_KEY_CHARS} characters, got {chars}"
        ));
    }
    Ok(SecretKey(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_database_url, parse_secret_key, DatabaseLocation, ServeArgs};
    use clap::Parser;
    use std::path::PathBuf;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn database_url_accepts_supported_shapes() {
        assert_eq!(
            parse_database_url("sqlite:///var/lib/jotbox.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("/var/lib/jotbox.db"))
        );
        assert_eq!(
            parse_database_url("sqlite://notes.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("notes.db"))
        );
        assert_eq!(
            parse_database_url("data/notes.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("data/notes.db"))
        );
        assert_eq!(
            parse_database_url(" :memory: ").unwrap(),
            DatabaseLocation::Memory
        );
        assert_eq!(
            parse_database_url("sqlite://:memory:").unwrap(),
            DatabaseLocation::Memory
        );
    }

    #[test]
    fn database_url_rejects_empty_and_foreign_schemes() {
        assert!(parse_database_url("  ").is_err());
        assert!(parse_database_url("sqlite://").is_err());
        assert!(parse_database_url("postgres://localhost/notes").is_err());
    }

    #[test]
    fn secret_key_requires_minimum_length_and_is_redacted() {
        assert!(parse_secret_key("too-short").is_err());
        let key = parse_secret_key(SECRET).unwrap();
        assert_eq!(key.expose(), SECRET);
        assert!(!format!("{key:?}").contains(SECRET));
    }

    #[test]
    fn file_location_opens_migrated_database() {
        let dir = tempfile::tempdir().unwrap();
        let location = DatabaseLocation::File(dir.path().join("jotbox.db"));
        let conn = location.open().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'notes', 'sessions');",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn flags_parse_with_defaults() {
        let args = ServeArgs::try_parse_from([
            "jotbox",
            "--database-url",
            ":memory:",
            "--secret-key",
            SECRET,
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
        ])
        .unwrap();
        assert_eq!(args.bind_address(), "127.0.0.1:8080");
        assert_eq!(args.session_ttl(), chrono::Duration::hours(24));
        assert_eq!(args.database_url, DatabaseLocation::Memory);
        assert!(args.log_dir.is_none());
    }

    #[test]
    fn flags_reject_short_secret_and_zero_ttl() {
        assert!(ServeArgs::try_parse_from([
            "jotbox",
            "--database-url",
            ":memory:",
            "--secret-key",
            "short",
        ])
        .is_err());
        assert!(ServeArgs::try_parse_from([
            "jotbox",
            "--database-url",
            ":memory:",
            "--secret-key",
            SECRET,
            "--session-ttl-hours",
            "0",
        ])
        .is_err());
    }
}
