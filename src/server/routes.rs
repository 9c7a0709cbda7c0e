//! HTTP route handlers for the notelock API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notes::NoteError;
use crate::summarize::SummarizeError;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/notes", post(create_note))
        .route("/api/notes/{id}", get(view_note))
        .route("/api/notes/{id}/summarize", post(summarize_note))
        .with_state(state)
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

/// Error response type shared by all handlers.
pub type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Map a note error to a status code, falling back to a generic 500 message.
///
/// Summarization failures never leak backend details: a missing model maps
/// to a generic 503, everything else to a generic 500.
fn map_note_error(err: &NoteError, fallback: &str) -> ApiError {
    match err {
        NoteError::NotFound => error_response(StatusCode::NOT_FOUND, "Note not found"),
        NoteError::InvalidPassword => error_response(StatusCode::UNAUTHORIZED, "Invalid password"),
        NoteError::InvalidNote(message) => error_response(StatusCode::BAD_REQUEST, message.clone()),
        NoteError::Summarize(SummarizeError::BackendNotConfigured) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Summarization service not available",
        ),
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, fallback),
    }
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "notelock",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Note creation request.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    /// The note body to store.
    pub note: Option<String>,
}

/// Note creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteResponse {
    /// Id of the created note.
    pub note_id: Uuid,
    /// Generated access password, shown once.
    pub password: String,
    /// Shareable link to the note.
    pub share_url: String,
}

/// Handle note creation.
async fn create_note(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<CreateNoteResponse>), ApiError> {
    let text = request
        .note
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "note cannot be empty"))?;

    let created = state.notes.create(&text).await.map_err(|err| {
        tracing::warn!("note creation failed: {err}");
        map_note_error(&err, "Failed to create note")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateNoteResponse {
            note_id: created.note_id,
            password: created.password,
            share_url: created.share_url,
        }),
    ))
}

/// Query parameters for note retrieval.
#[derive(Debug, Deserialize)]
pub struct ViewNoteParams {
    /// Access password for the note.
    pub password: Option<String>,
}

/// Note retrieval response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNoteResponse {
    /// Note id.
    pub id: Uuid,
    /// Note body.
    pub text: String,
    /// Creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Handle authenticated note retrieval.
async fn view_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ViewNoteParams>,
) -> Result<Json<ViewNoteResponse>, ApiError> {
    let password = params
        .password
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Password is required"))?;
    let note_id = parse_note_id(&id)?;

    let view = state
        .notes
        .view(note_id, &password)
        .await
        .map_err(|err| map_note_error(&err, "Failed to retrieve note"))?;

    Ok(Json(ViewNoteResponse {
        id: view.id,
        text: view.text,
        created_at: view.created_at,
    }))
}

/// Summarization request.
#[derive(Debug, Deserialize)]
pub struct SummarizeNoteRequest {
    /// Access password for the note.
    pub password: Option<String>,
}

/// Summarization response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeNoteResponse {
    /// Id of the summarized note.
    pub note_id: Uuid,
    /// Rendered bullet summary.
    pub summary: String,
    /// Whether the summary was served from a cache.
    pub cached: bool,
}

/// Handle authenticated note summarization.
async fn summarize_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SummarizeNoteRequest>,
) -> Result<Json<SummarizeNoteResponse>, ApiError> {
    let password = request
        .password
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Password is required"))?;
    let note_id = parse_note_id(&id)?;

    let outcome = state
        .notes
        .summarize(note_id, &password)
        .await
        .map_err(|err| {
            tracing::warn!(note_id = %id, "summarization failed: {err}");
            map_note_error(&err, "Failed to summarize note")
        })?;

    Ok(Json(SummarizeNoteResponse {
        note_id: outcome.note_id,
        summary: outcome.summary,
        cached: outcome.cached,
    }))
}

/// A malformed id cannot name any stored note, so it reads as not-found.
fn parse_note_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| error_response(StatusCode::NOT_FOUND, "Note not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let (status, _) = map_note_error(&NoteError::NotFound, "fallback");
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = map_note_error(&NoteError::InvalidPassword, "fallback");
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = map_note_error(
            &NoteError::InvalidNote("note cannot be empty".to_string()),
            "fallback",
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = map_note_error(
            &NoteError::Summarize(SummarizeError::BackendNotConfigured),
            "fallback",
        );
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        // Generic message only, no configuration hints.
        assert_eq!(body.error, "Summarization service not available");

        let (status, body) = map_note_error(
            &NoteError::Summarize(SummarizeError::BackendTimeout),
            "Failed to summarize note",
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to summarize note");

        let (status, _) = map_note_error(
            &NoteError::Summarize(SummarizeError::BackendUnreachable(
                "http://127.0.0.1:11434".to_string(),
            )),
            "Failed to summarize note",
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_note_id() {
        assert!(parse_note_id("not-a-uuid").is_err());
        assert!(parse_note_id("123e4567-e89b-12d3-a456-426614174000").is_ok());
    }

    #[test]
    fn test_response_shapes_are_camel_case() {
        let response = CreateNoteResponse {
            note_id: Uuid::nil(),
            password: "ABCD1234".to_string(),
            share_url: "http://localhost:3000/note/x".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap_or_default();
        assert!(value.get("noteId").is_some());
        assert!(value.get("shareUrl").is_some());

        let response = SummarizeNoteResponse {
            note_id: Uuid::nil(),
            summary: "• x".to_string(),
            cached: false,
        };
        let value = serde_json::to_value(&response).unwrap_or_default();
        assert!(value.get("noteId").is_some());
        assert_eq!(value["cached"], false);
    }
}
