//! Password-protected notes: creation, retrieval and summarization.
//!
//! A created note gets a random access password; the plaintext is returned
//! once to the creator and only its Argon2 hash is stored. Every later
//! operation re-verifies the password against that hash.

pub mod error;
pub mod note;
pub mod password;
pub mod store;

pub use error::{NoteError, NoteResult};
pub use note::Note;
pub use store::{NoteStore, SqliteNoteStore};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::summarize::Summarizer;

/// Maximum note length in characters.
pub const MAX_NOTE_CHARS: usize = 500;

/// Result of creating a note. The plaintext password appears here and
/// nowhere else.
#[derive(Clone, Debug)]
pub struct CreatedNote {
    /// Id of the stored note.
    pub note_id: Uuid,
    /// Generated access password, shown once.
    pub password: String,
    /// Shareable link to the note.
    pub share_url: String,
}

/// A note as returned to an authenticated viewer.
#[derive(Clone, Debug)]
pub struct NoteView {
    /// Note id.
    pub id: Uuid,
    /// Note body.
    pub text: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Result of summarizing a note.
#[derive(Clone, Debug)]
pub struct SummaryOutcome {
    /// Id of the summarized note.
    pub note_id: Uuid,
    /// Rendered bullet summary.
    pub summary: String,
    /// Whether the summary was served from a cache. Summaries are always
    /// regenerated, so this is currently always `false`; the field exists
    /// for response-shape stability.
    pub cached: bool,
}

/// Service coordinating note storage, password checks and summarization.
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    summarizer: Arc<Summarizer>,
    share_base_url: String,
}

impl NoteService {
    /// Create a new note service.
    #[must_use]
    pub fn new(
        store: Arc<dyn NoteStore>,
        summarizer: Arc<Summarizer>,
        share_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            summarizer,
            share_base_url: share_base_url.into(),
        }
    }

    /// Create a note and mint its access password.
    ///
    /// # Errors
    /// Returns an error if the text is empty or too long, or if hashing or
    /// storage fails.
    pub async fn create(&self, text: &str) -> NoteResult<CreatedNote> {
        validate_note_text(text)?;

        let note_id = Uuid::new_v4();
        let access_password = password::generate_password();
        let password_hash = password::hash_password(&access_password)?;

        let note = Note::new(note_id, text.to_string(), password_hash, Utc::now());
        self.store.insert(note).await?;

        info!(%note_id, "note created");

        Ok(CreatedNote {
            note_id,
            password: access_password,
            share_url: format!(
                "{}/note/{note_id}",
                self.share_base_url.trim_end_matches('/')
            ),
        })
    }

    /// Retrieve a note body given its id and password.
    ///
    /// # Errors
    /// Returns [`NoteError::NotFound`] for an unknown id and
    /// [`NoteError::InvalidPassword`] for a failed password check.
    pub async fn view(&self, id: Uuid, password_plain: &str) -> NoteResult<NoteView> {
        let note = self.authenticate(id, password_plain).await?;
        Ok(NoteView {
            id: note.id,
            text: note.text,
            created_at: note.created_at,
        })
    }

    /// Summarize a note given its id and password.
    ///
    /// The summary is always regenerated (never served from the stored
    /// copy), then persisted against the note for external consumers.
    ///
    /// # Errors
    /// Fails on unknown id, bad password, or a summarization pipeline error.
    pub async fn summarize(&self, id: Uuid, password_plain: &str) -> NoteResult<SummaryOutcome> {
        let note = self.authenticate(id, password_plain).await?;

        debug!(note_id = %id, "regenerating summary");
        let summary = self.summarizer.summarize(&note.text).await?;
        let generated_at = Utc::now();

        self.store
            .set_summary(id, summary.rendered_text.clone(), generated_at)
            .await?;

        info!(note_id = %id, bullets = summary.bullets.len(), "summary generated");

        Ok(SummaryOutcome {
            note_id: id,
            summary: summary.rendered_text,
            cached: false,
        })
    }

    async fn authenticate(&self, id: Uuid, password_plain: &str) -> NoteResult<Note> {
        let note = self.store.find(id).await?.ok_or(NoteError::NotFound)?;
        if !password::verify_password(password_plain, &note.password_hash)? {
            return Err(NoteError::InvalidPassword);
        }
        Ok(note)
    }
}

/// Validate note text against the creation limits (1..=500 characters).
///
/// # Errors
/// Returns [`NoteError::InvalidNote`] when the limits are violated.
pub fn validate_note_text(text: &str) -> NoteResult<()> {
    if text.trim().is_empty() {
        return Err(NoteError::InvalidNote("note cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_NOTE_CHARS {
        return Err(NoteError::InvalidNote(format!(
            "note must be under {MAX_NOTE_CHARS} characters"
        )));
    }
    Ok(())
}
