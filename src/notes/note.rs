//! The stored note record.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored note with its access credential and cached summary.
#[derive(Clone, Debug)]
pub struct Note {
    /// Note id, also the share-link path segment.
    pub id: Uuid,
    /// The pasted note body.
    pub text: String,
    /// Argon2 hash of the access password.
    pub password_hash: String,
    /// Last generated summary, if any.
    pub summary: Option<String>,
    /// When the summary was generated.
    pub summary_generated_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a fresh note with no summary.
    #[must_use]
    pub fn new(id: Uuid, text: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            password_hash,
            summary: None,
            summary_generated_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
