//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::notes::{NoteService, SqliteNoteStore};
use crate::summarize::{Summarizer, SummarizerConfig};

/// Environment variable for the note database path.
const DB_PATH_ENV: &str = "NOTELOCK_DB";

/// Environment variable for the share-link base URL.
const SHARE_URL_ENV: &str = "NOTELOCK_SHARE_URL";

/// Default note database path.
const DEFAULT_DB_PATH: &str = "notes.sqlite";

/// Default share-link base URL.
const DEFAULT_SHARE_URL: &str = "http://localhost:3000";

/// Shared application state.
pub struct AppState {
    /// Note service coordinating storage, passwords and summarization.
    pub notes: NoteService,
}

impl AppState {
    /// Create a new application state from the environment.
    ///
    /// # Errors
    /// Returns an error if the summarizer or note database cannot be set up.
    pub async fn new() -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let summarizer_config = SummarizerConfig::from_env();
        let summarizer = Summarizer::new(&summarizer_config)
            .map_err(|e| format!("Failed to create summarizer: {e}"))?;

        let db_path = std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let store = SqliteNoteStore::new(&db_path)
            .await
            .map_err(|e| format!("Failed to open note database at {db_path}: {e}"))?;

        let share_base_url =
            std::env::var(SHARE_URL_ENV).unwrap_or_else(|_| DEFAULT_SHARE_URL.to_string());

        tracing::info!(
            backend = %summarizer_config.base_url,
            model = %summarizer_config.model,
            db = %db_path,
            "state initialized"
        );

        Ok(Arc::new(Self {
            notes: NoteService::new(Arc::new(store), Arc::new(summarizer), share_base_url),
        }))
    }
}
