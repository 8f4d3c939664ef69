use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    let api = Router::new()
        // Books
        .route("/books", get(handlers::list_books))
        .route(
            "/books",
            post(handlers::create_book).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/books/:id", get(handlers::get_book))
        .route(
            "/books/:id",
            put(handlers::update_book).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/books/:id", delete(handlers::delete_book))
        .route("/books/:id/status", patch(handlers::update_status))
        // Notes. POST and GET scope the path parameter to a book id;
        // DELETE takes a note id on the same path shape.
        .route(
            "/notes/:id",
            post(handlers::create_note)
                .get(handlers::list_notes)
                .delete(handlers::delete_note),
        );

    let mut router = Router::new()
        .route("/", get(handlers::welcome))
        .nest("/api/v1", api)
        // Uploaded images
        .route("/uploads/:filename", get(handlers::serve_upload))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
