//! Note use-case service.
//!
//! # Responsibility
//! - Provide owner-scoped list/current/create/update/set-current/delete APIs.
//! - Validate title input before it reaches the repository.
//!
//! # Invariants
//! - A new note is always the owner's only current note.
//! - `update_note` never changes `is_current`.
//! - Deleting the current note leaves the owner without a current note; no
//!   replacement is promoted.
//! - Note list is always sorted by `updated_at DESC, id DESC`.

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::repo::note_repo::NoteRepository;
use crate::service::ServiceError;
use log::{debug, info};

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the owner's notes, most recently updated first.
    pub fn list_notes(&self, owner: UserId) -> Result<Vec<Note>, ServiceError> {
        let notes = self.repo.list_notes(owner)?;
        debug!(
            "event=note_list module=notes status=ok user_id={owner} count={}",
            notes.len()
        );
        Ok(notes)
    }

    /// Gets one owned note. A foreign note reads as missing.
    pub fn get_note(&self, owner: UserId, id: NoteId) -> Result<Option<Note>, ServiceError> {
        Ok(self.repo.get_note(owner, id)?)
    }

    /// Gets the owner's current note.
    pub fn current_note(&self, owner: UserId) -> Result<Option<Note>, ServiceError> {
        Ok(self.repo.current_note(owner)?)
    }

    /// Creates a note that becomes the owner's current note.
    pub fn create_note(
        &mut self,
        owner: UserId,
        title: &str,
        content: &str,
    ) -> Result<Note, ServiceError> {
        let draft = NoteDraft::new(title, content)?;
        let note = self.repo.create_note(owner, &draft)?;
        info!(
            "event=note_create module=notes status=ok user_id={owner} note_id={} title_len={} content_len={}",
            note.id,
            note.title.len(),
            note.content.len()
        );
        Ok(note)
    }

    /// Replaces title and content of an owned note.
    ///
    /// `input` is `(title, content)`, or `None` when the caller sent nothing.
    /// Ownership outranks input problems: a missing or foreign id is
    /// `NotFound` even when `input` is absent or the title is blank. The
    /// happy path is a single owner-scoped write; the extra lookup only
    /// runs to classify a rejected input.
    pub fn update_note(
        &self,
        owner: UserId,
        id: NoteId,
        input: Option<(&str, &str)>,
    ) -> Result<Note, ServiceError> {
        let draft = input
            .ok_or(ValidationError::MissingInput)
            .and_then(|(title, content)| NoteDraft::new(title, content));

        let draft = match draft {
            Ok(draft) => draft,
            Err(err) => {
                if self.repo.get_note(owner, id)?.is_none() {
                    info!("event=note_update module=notes status=rejected user_id={owner} note_id={id} reason=not_found");
                    return Err(ServiceError::NotFound);
                }
                return Err(err.into());
            }
        };

        let note = self.repo.update_note(owner, id, &draft)?;
        info!(
            "event=note_update module=notes status=ok user_id={owner} note_id={id} title_len={} content_len={}",
            note.title.len(),
            note.content.len()
        );
        Ok(note)
    }

    /// Marks an owned note as the owner's only current note.
    pub fn set_current_note(&mut self, owner: UserId, id: NoteId) -> Result<Note, ServiceError> {
        let note = self.repo.set_current_note(owner, id)?;
        info!("event=note_set_current module=notes status=ok user_id={owner} note_id={id}");
        Ok(note)
    }

    /// Permanently deletes an owned note.
    pub fn delete_note(&self, owner: UserId, id: NoteId) -> Result<(), ServiceError> {
        self.repo.delete_note(owner, id)?;
        info!("event=note_delete module=notes status=ok user_id={owner} note_id={id}");
        Ok(())
    }
}
