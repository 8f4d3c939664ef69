use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use booknest::api::handlers::{self, BookForm, CreateNoteRequest, StatusBody, Upload};
use booknest::api::response::{ApiError, AppJson};
use booknest::config::Config;
use booknest::storage::models::BookStatus;
use booknest::storage::Database;
use booknest::uploads::UploadStore;
use booknest::AppState;

fn test_state() -> (tempfile::TempDir, Arc<AppState>) {
    let dir = tempfile::tempdir().unwrap();

    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        data_dir: dir.path().join("data").to_string_lossy().to_string(),
        upload_dir: dir.path().join("uploads").to_string_lossy().to_string(),
        max_upload_size: 10 * 1024 * 1024,
        test_mode: true,
    };

    let db = Database::open(&config.data_dir).expect("Failed to open test database");
    let uploads = UploadStore::new(&config.upload_dir).expect("Failed to create upload store");

    let state = Arc::new(AppState {
        config,
        db,
        uploads: Arc::new(uploads),
    });
    (dir, state)
}

fn dune_form() -> BookForm {
    BookForm {
        title: Some("Dune".to_string()),
        author: Some("Herbert".to_string()),
        ..Default::default()
    }
}

fn patch_status(status: &str) -> AppJson<StatusBody> {
    AppJson(StatusBody {
        status: Some(status.to_string()),
    })
}

// ============================================================================
// Book lifecycle
// ============================================================================

#[tokio::test]
async fn test_dune_lifecycle() {
    let (_dir, state) = test_state();

    // POST /books {title: "Dune", author: "Herbert"}
    let created = handlers::create_book(State(Arc::clone(&state)), dune_form())
        .await
        .unwrap()
        .0;
    assert_eq!(created.status, BookStatus::ToRead);
    assert_eq!(created.image, "/uploads/placeholder.png");
    assert_eq!(created.genre, None);

    // GET /books/:id returns identical field values
    let fetched = handlers::get_book(State(Arc::clone(&state)), Path(created.id.clone()))
        .await
        .unwrap()
        .0;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, created.title);
    assert_eq!(fetched.author, created.author);
    assert_eq!(fetched.status, created.status);
    assert_eq!(fetched.image, created.image);
    assert_eq!(fetched.created_at, created.created_at);

    // PATCH /books/:id/status {status: "Reading"}
    let updated = handlers::update_status(
        State(Arc::clone(&state)),
        Path(created.id.clone()),
        patch_status("Reading"),
    )
    .await
    .unwrap()
    .0;
    assert_eq!(updated.status, BookStatus::Reading);

    // PATCH with {status: "Finished"} is rejected and changes nothing
    let err = handlers::update_status(
        State(Arc::clone(&state)),
        Path(created.id.clone()),
        patch_status("Finished"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let unchanged = state.db.get_book(&created.id).unwrap().unwrap();
    assert_eq!(unchanged.status, BookStatus::Reading);

    // DELETE then GET -> 404
    handlers::delete_book(State(Arc::clone(&state)), Path(created.id.clone()))
        .await
        .unwrap();
    let err = handlers::get_book(State(Arc::clone(&state)), Path(created.id.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_list_books() {
    let (_dir, state) = test_state();

    handlers::create_book(State(Arc::clone(&state)), dune_form())
        .await
        .unwrap();
    let mut form = dune_form();
    form.title = Some("Dune Messiah".to_string());
    handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap();

    let books = handlers::list_books(State(Arc::clone(&state)))
        .await
        .unwrap()
        .0;
    assert_eq!(books.len(), 2);
}

// ============================================================================
// Create validation
// ============================================================================

#[tokio::test]
async fn test_create_requires_title_and_author() {
    let (_dir, state) = test_state();

    let mut form = dune_form();
    form.title = None;
    let err = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let mut form = dune_form();
    form.author = Some("   ".to_string());
    let err = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    assert!(state.db.list_books().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_invalid_status() {
    let (_dir, state) = test_state();

    let mut form = dune_form();
    form.status = Some("Finished".to_string());
    let err = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // Rejected before any store mutation
    assert!(state.db.list_books().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_explicit_status() {
    let (_dir, state) = test_state();

    let mut form = dune_form();
    form.status = Some("Completed".to_string());
    let created = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap()
        .0;
    assert_eq!(created.status, BookStatus::Completed);
}

// ============================================================================
// Image resolution
// ============================================================================

#[tokio::test]
async fn test_create_with_uploaded_file() {
    let (_dir, state) = test_state();

    let mut form = dune_form();
    form.upload = Some(Upload {
        file_name: "cover.png".to_string(),
        data: Bytes::from("png bytes"),
    });
    let created = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap()
        .0;

    assert!(created.image.starts_with("/uploads/"));
    assert!(created.image.ends_with("-cover.png"));
    let stored_name = created.image.strip_prefix("/uploads/").unwrap();
    assert!(state.uploads.exists(stored_name).await);
}

#[tokio::test]
async fn test_create_with_image_url() {
    let (_dir, state) = test_state();

    let mut form = dune_form();
    form.image_url = Some("https://covers.example.com/dune.jpg".to_string());
    let created = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap()
        .0;
    assert_eq!(created.image, "https://covers.example.com/dune.jpg");
}

#[tokio::test]
async fn test_upload_overrides_image_url() {
    let (_dir, state) = test_state();

    let mut form = dune_form();
    form.image_url = Some("https://covers.example.com/dune.jpg".to_string());
    form.upload = Some(Upload {
        file_name: "cover.png".to_string(),
        data: Bytes::from("png bytes"),
    });
    let created = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap()
        .0;
    assert!(created.image.starts_with("/uploads/"));
}

#[tokio::test]
async fn test_update_keeps_image_when_none_supplied() {
    let (_dir, state) = test_state();

    let mut form = dune_form();
    form.image_url = Some("https://covers.example.com/dune.jpg".to_string());
    let created = handlers::create_book(State(Arc::clone(&state)), form)
        .await
        .unwrap()
        .0;

    let mut update = BookForm::default();
    update.genre = Some("Sci-Fi".to_string());
    let updated = handlers::update_book(
        State(Arc::clone(&state)),
        Path(created.id.clone()),
        update,
    )
    .await
    .unwrap()
    .0;

    // No placeholder fallback on update
    assert_eq!(updated.image, "https://covers.example.com/dune.jpg");
    assert_eq!(updated.genre, Some("Sci-Fi".to_string()));
}

// ============================================================================
// Update validation
// ============================================================================

#[tokio::test]
async fn test_update_rejects_invalid_status_without_side_effects() {
    let (_dir, state) = test_state();

    let created = handlers::create_book(State(Arc::clone(&state)), dune_form())
        .await
        .unwrap()
        .0;

    let mut update = BookForm::default();
    update.title = Some("Changed Title".to_string());
    update.status = Some("Abandoned".to_string());
    let err = handlers::update_book(
        State(Arc::clone(&state)),
        Path(created.id.clone()),
        update,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // The whole update was rejected, including the title change
    let stored = state.db.get_book(&created.id).unwrap().unwrap();
    assert_eq!(stored.title, "Dune");
    assert_eq!(stored.status, BookStatus::ToRead);
}

#[tokio::test]
async fn test_update_not_found() {
    let (_dir, state) = test_state();

    let mut update = BookForm::default();
    update.title = Some("Anything".to_string());
    let err = handlers::update_book(
        State(Arc::clone(&state)),
        Path("nonexistent".to_string()),
        update,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_update_not_found_writes_no_upload() {
    let (_dir, state) = test_state();

    let mut update = BookForm::default();
    update.upload = Some(Upload {
        file_name: "cover.png".to_string(),
        data: Bytes::from("png bytes"),
    });
    let err = handlers::update_book(
        State(Arc::clone(&state)),
        Path("nonexistent".to_string()),
        update,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    // The rejected update must not leave an orphaned file behind
    let entries = std::fs::read_dir(&state.config.upload_dir).unwrap().count();
    assert_eq!(entries, 0);
}

#[tokio::test]
async fn test_delete_not_found() {
    let (_dir, state) = test_state();

    let err = handlers::delete_book(State(Arc::clone(&state)), Path("nonexistent".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_patch_status_requires_status() {
    let (_dir, state) = test_state();

    let err = handlers::update_status(
        State(Arc::clone(&state)),
        Path("any".to_string()),
        AppJson(StatusBody { status: None }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

// ============================================================================
// Notes
// ============================================================================

#[tokio::test]
async fn test_notes_create_and_list_newest_first() {
    let (_dir, state) = test_state();

    let (code, first) = handlers::create_note(
        State(Arc::clone(&state)),
        Path("book-1".to_string()),
        AppJson(CreateNoteRequest {
            content: Some("Great opening".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(first.book_id, "book-1");

    // Distinct creation times for a deterministic order
    tokio::time::sleep(Duration::from_millis(5)).await;

    handlers::create_note(
        State(Arc::clone(&state)),
        Path("book-1".to_string()),
        AppJson(CreateNoteRequest {
            content: Some("Slow middle".to_string()),
        }),
    )
    .await
    .unwrap();

    let notes = handlers::list_notes(State(Arc::clone(&state)), Path("book-1".to_string()))
        .await
        .unwrap()
        .0;
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].content, "Slow middle");
    assert_eq!(notes[1].content, "Great opening");
}

#[tokio::test]
async fn test_note_create_requires_content() {
    let (_dir, state) = test_state();

    let err = handlers::create_note(
        State(Arc::clone(&state)),
        Path("book-1".to_string()),
        AppJson(CreateNoteRequest { content: None }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_note_accepts_unknown_book() {
    let (_dir, state) = test_state();

    // No referential integrity against books
    let (code, note) = handlers::create_note(
        State(Arc::clone(&state)),
        Path("no-such-book".to_string()),
        AppJson(CreateNoteRequest {
            content: Some("orphan".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(note.book_id, "no-such-book");
}

#[tokio::test]
async fn test_list_notes_unknown_book_is_empty() {
    let (_dir, state) = test_state();

    let notes = handlers::list_notes(State(Arc::clone(&state)), Path("nope".to_string()))
        .await
        .unwrap()
        .0;
    assert!(notes.is_empty());
}

#[tokio::test]
async fn test_delete_note_and_not_found() {
    let (_dir, state) = test_state();

    let (_, Json(note)) = handlers::create_note(
        State(Arc::clone(&state)),
        Path("book-1".to_string()),
        AppJson(CreateNoteRequest {
            content: Some("bye".to_string()),
        }),
    )
    .await
    .unwrap();

    handlers::delete_note(State(Arc::clone(&state)), Path(note.id.clone()))
        .await
        .unwrap();

    let err = handlers::delete_note(State(Arc::clone(&state)), Path(note.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ============================================================================
// Upload serving
// ============================================================================

#[tokio::test]
async fn test_serve_upload() {
    let (_dir, state) = test_state();

    let path = state
        .uploads
        .save("cover.png", Bytes::from("png bytes"))
        .await
        .unwrap();
    let stored_name = path.strip_prefix("/uploads/").unwrap().to_string();

    let response = handlers::serve_upload(State(Arc::clone(&state)), Path(stored_name))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap(),
        "image/png"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body, Bytes::from("png bytes"));
}

#[tokio::test]
async fn test_serve_upload_missing_or_traversal() {
    let (_dir, state) = test_state();

    for name in ["missing.png", "../secret", ".."] {
        let err = handlers::serve_upload(State(Arc::clone(&state)), Path(name.to_string()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ApiError::NotFound(_)),
            "expected NotFound for {name:?}"
        );
    }
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_purge() {
    let (_dir, state) = test_state();

    handlers::create_book(State(Arc::clone(&state)), dune_form())
        .await
        .unwrap();
    handlers::create_note(
        State(Arc::clone(&state)),
        Path("book-1".to_string()),
        AppJson(CreateNoteRequest {
            content: Some("note".to_string()),
        }),
    )
    .await
    .unwrap();

    let purged = handlers::admin_purge(State(Arc::clone(&state)))
        .await
        .unwrap()
        .0;
    assert_eq!(purged.books_deleted, 1);
    assert_eq!(purged.notes_deleted, 1);
    assert!(state.db.list_books().unwrap().is_empty());
}
