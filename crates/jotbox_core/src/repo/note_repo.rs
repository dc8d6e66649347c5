//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped note persistence APIs.
//! - Own the single-current-note state transitions (`create_note`,
//!   `set_current_note`) with atomic semantics.
//!
//! # Invariants
//! - Every statement filters on `user_id`; a note owned by someone else is
//!   indistinguishable from a missing one.
//! - `create_note` and `set_current_note` clear the owner's current flag and
//!   set the new one inside a single `IMMEDIATE` transaction.
//! - Note list is always sorted by `updated_at DESC, id DESC`.
//! - Every create/update stamps `updated_at` strictly above the owner's
//!   current maximum, so the last touched note always sorts first.

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::user::UserId;
use crate::repo::{bool_from_db, ensure_tables, from_micros, to_micros, RepoError, RepoResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    content,
    created_at,
    updated_at,
    is_current
FROM notes";

/// Next `updated_at` for owner `?2` given wall clock `?1` (microseconds).
const NEXT_TOUCH_SQL: &str = "MAX(
    ?1,
    COALESCE((SELECT MAX(updated_at) FROM notes WHERE user_id = ?2), 0) + 1
)";

/// Repository interface for owner-scoped note operations.
pub trait NoteRepository {
    /// Lists every note of `owner`, most recently updated first.
    fn list_notes(&self, owner: UserId) -> RepoResult<Vec<Note>>;
    /// Gets one note when it exists and belongs to `owner`.
    fn get_note(&self, owner: UserId, id: NoteId) -> RepoResult<Option<Note>>;
    /// Gets the owner's current note, if any.
    fn current_note(&self, owner: UserId) -> RepoResult<Option<Note>>;
    /// Inserts a note and makes it the owner's only current note.
    fn create_note(&mut self, owner: UserId, draft: &NoteDraft) -> RepoResult<Note>;
    /// Replaces title/content and refreshes `updated_at`; keeps `is_current`.
    fn update_note(&self, owner: UserId, id: NoteId, draft: &NoteDraft) -> RepoResult<Note>;
    /// Makes the note the owner's only current note.
    fn set_current_note(&mut self, owner: UserId, id: NoteId) -> RepoResult<Note>;
    /// Permanently removes the note. No other note becomes current.
    fn delete_note(&self, owner: UserId, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "notes"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list_notes(&self, owner: UserId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY updated_at DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([owner])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get_note(&self, owner: UserId, id: NoteId) -> RepoResult<Option<Note>> {
        load_note(self.conn, owner, id)
    }

    fn current_note(&self, owner: UserId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE user_id = ?1
               AND is_current = 1;"
        ))?;
        let mut rows = stmt.query([owner])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let note = parse_note_row(row)?;
        if rows.next()?.is_some() {
            return Err(RepoError::InvalidData(format!(
                "user {owner} has more than one current note"
            )));
        }
        Ok(Some(note))
    }

    fn create_note(&mut self, owner: UserId, draft: &NoteDraft) -> RepoResult<Note> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let touched: i64 = tx.query_row(
            &format!("SELECT {NEXT_TOUCH_SQL};"),
            params![to_micros(Utc::now()), owner],
            |row| row.get(0),
        )?;
        clear_current_in_tx(&tx, owner)?;
        tx.execute(
            "INSERT INTO notes (user_id, title, content, created_at, updated_at, is_current)
             VALUES (?1, ?2, ?3, ?4, ?4, 1);",
            params![owner, draft.title(), draft.content(), touched],
        )?;
        let id = tx.last_insert_rowid();
        let note = load_note(&tx, owner, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created note {id} not found in read-back"))
        })?;

        tx.commit()?;
        Ok(note)
    }

    fn update_note(&self, owner: UserId, id: NoteId, draft: &NoteDraft) -> RepoResult<Note> {
        // One statement, so the max-plus-one stamp cannot interleave.
        let changed = self.conn.execute(
            &format!(
                "UPDATE notes
                 SET
                    title = ?4,
                    content = ?5,
                    updated_at = {NEXT_TOUCH_SQL}
                 WHERE id = ?3
                   AND user_id = ?2;"
            ),
            params![
                to_micros(Utc::now()),
                owner,
                id,
                draft.title(),
                draft.content()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }

        load_note(self.conn, owner, id)?.ok_or(RepoError::NoteNotFound(id))
    }

    fn set_current_note(&mut self, owner: UserId, id: NoteId) -> RepoResult<Note> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !note_exists_in_tx(&tx, owner, id)? {
            return Err(RepoError::NoteNotFound(id));
        }

        // Clear first: the partial unique index is checked per statement.
        clear_current_in_tx(&tx, owner)?;
        tx.execute(
            "UPDATE notes
             SET is_current = 1
             WHERE id = ?1
               AND user_id = ?2;",
            params![id, owner],
        )?;
        let note = load_note(&tx, owner, id)?.ok_or(RepoError::NoteNotFound(id))?;

        tx.commit()?;
        Ok(note)
    }

    fn delete_note(&self, owner: UserId, id: NoteId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2;",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }
        Ok(())
    }
}

fn load_note(conn: &Connection, owner: UserId, id: NoteId) -> RepoResult<Option<Note>> {
    let raw = conn
        .query_row(
            &format!(
                "{NOTE_SELECT_SQL}
                 WHERE id = ?1
                   AND user_id = ?2;"
            ),
            params![id, owner],
            RawNote::from_row,
        )
        .optional()?;
    raw.map(RawNote::into_note).transpose()
}

fn clear_current_in_tx(tx: &Transaction<'_>, owner: UserId) -> RepoResult<usize> {
    let cleared = tx.execute(
        "UPDATE notes
         SET is_current = 0
         WHERE user_id = ?1
           AND is_current = 1;",
        [owner],
    )?;
    Ok(cleared)
}

fn note_exists_in_tx(tx: &Transaction<'_>, owner: UserId, id: NoteId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM notes
            WHERE id = ?1
              AND user_id = ?2
        );",
        params![id, owner],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    RawNote::from_row(row)?.into_note()
}

struct RawNote {
    id: NoteId,
    owner_id: UserId,
    title: String,
    content: String,
    created_at: i64,
    updated_at: i64,
    is_current: i64,
}

impl RawNote {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("user_id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            is_current: row.get("is_current")?,
        })
    }

    fn into_note(self) -> RepoResult<Note> {
        Ok(Note {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            content: self.content,
            created_at: from_micros(self.created_at, "notes.created_at")?,
            updated_at: from_micros(self.updated_at, "notes.updated_at")?,
            is_current: bool_from_db(self.is_current, "notes.is_current")?,
        })
    }
}
