//! SQLite storage for Jotbox: connection bootstrap and schema migrations.
//!
//! A connection handed out by this module is configured (foreign keys,
//! busy timeout) and fully migrated. Repositories rely on both, so nothing
//! outside this module opens a raw `Connection`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to produce a usable, migrated connection.
#[derive(Debug)]
pub enum DbError {
    /// The database file's parent directory does not exist. SQLite creates
    /// the file but never the directories leading to it.
    MissingDirectory(PathBuf),
    /// A numbered migration failed; the batch was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDirectory(dir) => {
                write!(f, "database directory `{}` does not exist", dir.display())
            }
            Self::Migration { version, source } => {
                write!(f, "migration {version:04} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::MissingDirectory(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
