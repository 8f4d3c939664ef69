use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub books_deleted: u64,
    pub notes_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the BookNest API".to_string(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PurgeResponse>, ApiError> {
    let stats = state.db.purge_all()?;

    tracing::warn!(books = stats.books, notes = stats.notes, "Purged all data");

    Ok(Json(PurgeResponse {
        books_deleted: stats.books,
        notes_deleted: stats.notes,
    }))
}
