//! `SQLite`-backed note storage.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::error::{NoteError, NoteResult};
use super::note::Note;

/// Boxed future type for note store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Note store trait.
pub trait NoteStore: Send + Sync {
    /// Insert a new note.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn insert(&self, note: Note) -> StoreFuture<'_, NoteResult<()>>;

    /// Find a note by id.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn find(&self, id: Uuid) -> StoreFuture<'_, NoteResult<Option<Note>>>;

    /// Attach a freshly generated summary to a note.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn set_summary(
        &self,
        id: Uuid,
        summary: String,
        generated_at: DateTime<Utc>,
    ) -> StoreFuture<'_, NoteResult<()>>;
}

/// `SQLite` implementation of the note store.
pub struct SqliteNoteStore {
    conn: Connection,
}

impl SqliteNoteStore {
    /// Open (or create) the note database at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> NoteResult<Self> {
        let conn = Connection::open(path.as_ref()).await?;
        Self::init_schema(conn).await
    }

    /// Open an in-memory note database, used by tests.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn in_memory() -> NoteResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init_schema(conn).await
    }

    async fn init_schema(conn: Connection) -> NoteResult<Self> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS notes (
                    id TEXT PRIMARY KEY,
                    text TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    summary TEXT,
                    summary_generated_at INTEGER,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                )",
            )?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }
}

impl NoteStore for SqliteNoteStore {
    fn insert(&self, note: Note) -> StoreFuture<'_, NoteResult<()>> {
        Box::pin(async move {
            let id = note.id.to_string();
            let created_at = note.created_at.timestamp_millis();
            let updated_at = note.updated_at.timestamp_millis();
            let summary_generated_at = note.summary_generated_at.map(|t| t.timestamp_millis());
            let text = note.text;
            let password_hash = note.password_hash;
            let summary = note.summary;

            self.conn
                .call(move |conn| {
                    conn.execute(
                        "INSERT INTO notes
                            (id, text, password_hash, summary, summary_generated_at,
                             created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        rusqlite::params![
                            id,
                            text,
                            password_hash,
                            summary,
                            summary_generated_at,
                            created_at,
                            updated_at
                        ],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn find(&self, id: Uuid) -> StoreFuture<'_, NoteResult<Option<Note>>> {
        Box::pin(async move {
            let id_text = id.to_string();
            let row = self
                .conn
                .call(move |conn| {
                    let row = conn
                        .query_row(
                            "SELECT text, password_hash, summary, summary_generated_at,
                                    created_at, updated_at
                             FROM notes WHERE id = ?1",
                            rusqlite::params![id_text],
                            |row| {
                                let text: String = row.get(0)?;
                                let password_hash: String = row.get(1)?;
                                let summary: Option<String> = row.get(2)?;
                                let summary_generated_at: Option<i64> = row.get(3)?;
                                let created_at: i64 = row.get(4)?;
                                let updated_at: i64 = row.get(5)?;
                                Ok((
                                    text,
                                    password_hash,
                                    summary,
                                    summary_generated_at,
                                    created_at,
                                    updated_at,
                                ))
                            },
                        )
                        .optional()?;
                    Ok(row)
                })
                .await?;

            let note = match row {
                Some((text, password_hash, summary, summary_generated_at, created_at, updated_at)) => {
                    let summary_generated_at = summary_generated_at
                        .map(|ms| parse_timestamp(ms, "summary_generated_at"))
                        .transpose()?;
                    Some(Note {
                        id,
                        text,
                        password_hash,
                        summary,
                        summary_generated_at,
                        created_at: parse_timestamp(created_at, "created_at")?,
                        updated_at: parse_timestamp(updated_at, "updated_at")?,
                    })
                }
                None => None,
            };

            Ok(note)
        })
    }

    fn set_summary(
        &self,
        id: Uuid,
        summary: String,
        generated_at: DateTime<Utc>,
    ) -> StoreFuture<'_, NoteResult<()>> {
        Box::pin(async move {
            let id_text = id.to_string();
            let generated_at_ms = generated_at.timestamp_millis();

            let changed = self
                .conn
                .call(move |conn| {
                    let changed = conn.execute(
                        "UPDATE notes
                         SET summary = ?2, summary_generated_at = ?3, updated_at = ?3
                         WHERE id = ?1",
                        rusqlite::params![id_text, summary, generated_at_ms],
                    )?;
                    Ok(changed)
                })
                .await?;

            if changed == 0 {
                return Err(NoteError::NotFound);
            }
            Ok(())
        })
    }
}

/// Decode a stored millisecond timestamp.
fn parse_timestamp(ms: i64, field: &str) -> NoteResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| NoteError::InvalidNote(format!("invalid {field} timestamp")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_note(text: &str) -> Note {
        Note::new(
            Uuid::new_v4(),
            text.to_string(),
            "hash".to_string(),
            Utc::now(),
        )
    }

    async fn open_store() -> SqliteNoteStore {
        match SqliteNoteStore::in_memory().await {
            Ok(store) => store,
            Err(err) => panic!("failed to open in-memory store: {err}"),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_roundtrip() {
        let store = open_store().await;
        let note = make_note("remember the milk");

        assert!(store.insert(note.clone()).await.is_ok());

        let found = store.find(note.id).await;
        let found = match found {
            Ok(Some(found)) => found,
            other => panic!("expected note, got {other:?}"),
        };
        assert_eq!(found.id, note.id);
        assert_eq!(found.text, "remember the milk");
        assert_eq!(found.password_hash, "hash");
        assert!(found.summary.is_none());
        assert!(found.summary_generated_at.is_none());
    }

    #[tokio::test]
    async fn test_find_missing_note_is_none() {
        let store = open_store().await;
        let found = store.find(Uuid::new_v4()).await;
        assert!(matches!(found, Ok(None)));
    }

    #[tokio::test]
    async fn test_set_summary_overwrites_on_regenerate() {
        let store = open_store().await;
        let note = make_note("note body");
        assert!(store.insert(note.clone()).await.is_ok());

        let first_at = Utc::now();
        assert!(
            store
                .set_summary(note.id, "• first".to_string(), first_at)
                .await
                .is_ok()
        );
        assert!(
            store
                .set_summary(note.id, "• second".to_string(), Utc::now())
                .await
                .is_ok()
        );

        let found = store.find(note.id).await;
        let found = match found {
            Ok(Some(found)) => found,
            other => panic!("expected note, got {other:?}"),
        };
        assert_eq!(found.summary.as_deref(), Some("• second"));
        assert!(found.summary_generated_at.is_some());
    }

    #[tokio::test]
    async fn test_set_summary_on_missing_note_is_not_found() {
        let store = open_store().await;
        let result = store
            .set_summary(Uuid::new_v4(), "• x".to_string(), Utc::now())
            .await;
        assert!(matches!(result, Err(NoteError::NotFound)));
    }
}
