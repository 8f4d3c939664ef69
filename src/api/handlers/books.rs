use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, Confirmation};
use crate::storage::models::{BookRecord, BookStatus};
use crate::uploads::PLACEHOLDER_IMAGE;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// An image file carried in a multipart book request.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

/// Book fields accepted by create and update, from either a multipart form
/// (text fields plus an optional `image` file) or a JSON body.
#[derive(Debug, Default)]
pub struct BookForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub upload: Option<Upload>,
}

#[derive(Debug, Default, Deserialize)]
struct BookBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "imageUrl")]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// Form extraction
// ============================================================================

#[axum::async_trait]
impl FromRequest<Arc<AppState>> for BookForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, ApiError> {
        let content_type = req
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?;
            from_multipart(multipart, state.config.max_upload_size).await
        } else {
            let AppJson(body) = AppJson::<BookBody>::from_request(req, state).await?;
            Ok(BookForm {
                title: body.title,
                author: body.author,
                genre: body.genre,
                status: body.status,
                image_url: body.image_url,
                upload: None,
            })
        }
    }
}

async fn from_multipart(mut multipart: Multipart, max_size: u64) -> Result<BookForm, ApiError> {
    let mut form = BookForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read image: {e}")))?;

                if data.len() as u64 > max_size {
                    return Err(ApiError::payload_too_large(format!(
                        "Image exceeds maximum upload size of {max_size} bytes"
                    )));
                }

                form.upload = Some(Upload { file_name, data });
            }
            "title" => form.title = Some(text_field(field, "title").await?),
            "author" => form.author = Some(text_field(field, "author").await?),
            "genre" => form.genre = Some(text_field(field, "genre").await?),
            "status" => form.status = Some(text_field(field, "status").await?),
            "imageUrl" => form.image_url = Some(text_field(field, "imageUrl").await?),
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok(form)
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid {name}: {e}")))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookRecord>>, ApiError> {
    let books = state.db.list_books()?;
    Ok(Json(books))
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    form: BookForm,
) -> Result<Json<BookRecord>, ApiError> {
    // All validation happens before any store mutation
    let status = parse_status(form.status.as_deref())?.unwrap_or_default();

    let title = require_field(form.title.as_deref(), "title")?;
    let author = require_field(form.author.as_deref(), "author")?;

    let image = match resolve_image(&state, form.upload, form.image_url).await? {
        Some(image) => image,
        None => PLACEHOLDER_IMAGE.to_string(),
    };

    let book = BookRecord {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        author,
        genre: form.genre,
        status,
        image,
        created_at: Utc::now(),
    };

    state.db.put_book(&book)?;

    tracing::debug!(book_id = %book.id, title = %book.title, "Created book");
    Ok(Json(book))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookRecord>, ApiError> {
    let book = state
        .db
        .get_book(&id)?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    Ok(Json(book))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    form: BookForm,
) -> Result<Json<BookRecord>, ApiError> {
    let status = parse_status(form.status.as_deref())?;

    // Verify the book exists before an uploaded file is written, so a bad id
    // cannot orphan a file in the upload directory
    state
        .db
        .get_book(&id)?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    // Unlike create, neither file nor URL means the stored image is kept
    let image = resolve_image(&state, form.upload, form.image_url).await?;

    let updated = state
        .db
        .update_book(
            &id,
            form.title.as_deref(),
            form.author.as_deref(),
            form.genre.as_deref(),
            status,
            image.as_deref(),
        )?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    tracing::debug!(book_id = %id, "Updated book");
    Ok(Json(updated))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    let deleted = state.db.delete_book(&id)?;
    if !deleted {
        return Err(ApiError::not_found("Book not found"));
    }

    tracing::debug!(book_id = %id, "Deleted book");
    Ok(Confirmation::new("Book deleted successfully"))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(body): AppJson<StatusBody>,
) -> Result<Json<BookRecord>, ApiError> {
    let status = body
        .status
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("status field is required"))?;
    let status: BookStatus = status
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid status value"))?;

    let updated = state
        .db
        .update_book(&id, None, None, None, Some(status), None)?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;

    tracing::debug!(book_id = %id, status = %status, "Updated book status");
    Ok(Json(updated))
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_status(raw: Option<&str>) -> Result<Option<BookStatus>, ApiError> {
    raw.map(|s| {
        s.parse::<BookStatus>()
            .map_err(|_| ApiError::bad_request("Invalid status value"))
    })
    .transpose()
}

fn require_field(value: Option<&str>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::bad_request(format!("{name} field is required"))),
    }
}

/// File upload wins over `imageUrl`; `None` means the caller supplied neither.
async fn resolve_image(
    state: &AppState,
    upload: Option<Upload>,
    image_url: Option<String>,
) -> Result<Option<String>, ApiError> {
    if let Some(upload) = upload {
        let path = state
            .uploads
            .save(&upload.file_name, upload.data)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to store image: {e}")))?;
        return Ok(Some(path));
    }

    Ok(image_url)
}
