use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, Confirmation};
use crate::storage::models::NoteRecord;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// Create a note under a book. The book id is not checked against existing
/// books; notes for unknown books are accepted.
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
    AppJson(req): AppJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteRecord>), ApiError> {
    let content = match req.content {
        Some(c) if !c.trim().is_empty() => c,
        _ => return Err(ApiError::bad_request("content field is required")),
    };

    let note = NoteRecord {
        id: uuid::Uuid::new_v4().to_string(),
        book_id,
        content,
        created_at: Utc::now(),
    };

    state.db.put_note(&note)?;

    tracing::debug!(note_id = %note.id, book_id = %note.book_id, "Created note");
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<Json<Vec<NoteRecord>>, ApiError> {
    let notes = state.db.notes_for_book(&book_id)?;
    Ok(Json(notes))
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    let deleted = state.db.delete_note(&id)?;
    if !deleted {
        return Err(ApiError::not_found("Note not found"));
    }

    tracing::debug!(note_id = %id, "Deleted note");
    Ok(Confirmation::new("Note deleted"))
}
