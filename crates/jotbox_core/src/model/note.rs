//! Note model.
//!
//! # Responsibility
//! - Define the persisted note record and its wire shape.
//! - Validate title/content input before it reaches storage.
//!
//! # Invariants
//! - `title` is never empty after trimming.
//! - At most one note per owner has `is_current == true` (enforced by the
//!   repository and a partial unique index).

use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stable identifier of a note.
pub type NoteId = i64;

/// Persisted note record.
///
/// Serializes to `{id, title, content, created_at, updated_at, is_current}`
/// with RFC 3339 timestamps; the owner is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(skip_serializing)]
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_current: bool,
}

/// Validated title/content pair used by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: String,
}

impl NoteDraft {
    /// Trims the title and rejects it when empty. Content is kept verbatim.
    pub fn new(title: &str, content: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Self {
            title: title.to_string(),
            content: content.into(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
