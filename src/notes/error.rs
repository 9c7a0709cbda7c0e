//! Error types for the notes subsystem.

use thiserror::Error;

use crate::summarize::SummarizeError;

/// Notes subsystem error type.
#[derive(Debug, Error)]
pub enum NoteError {
    /// No note exists for the requested id.
    #[error("note not found")]
    NotFound,
    /// The supplied password does not match the note's hash.
    #[error("invalid password")]
    InvalidPassword,
    /// Invalid note content or stored record.
    #[error("invalid note: {0}")]
    InvalidNote(String),
    /// Password hashing or verification error.
    #[error("password hash error: {0}")]
    Hash(String),
    /// `SQLite` storage error.
    #[error("storage error: {0}")]
    Storage(#[from] tokio_rusqlite::Error),
    /// Summarization pipeline error.
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

/// Convenience result alias for note operations.
pub type NoteResult<T> = Result<T, NoteError>;
