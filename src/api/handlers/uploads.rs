use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::uploads::UploadError;
use crate::AppState;

/// Serve an uploaded image by its stored name.
/// Route: GET /uploads/:filename
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(filename): axum::extract::Path<String>,
) -> Result<Response, ApiError> {
    let data = state.uploads.open(&filename).await.map_err(|e| match e {
        UploadError::NotFound(_) | UploadError::InvalidName(_) => {
            ApiError::not_found("Image not found")
        }
        _ => ApiError::internal(format!("Failed to read image: {e}")),
    })?;

    let mime_type = mime_guess::from_path(&filename)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let len = data.len();
    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(len));

    // Stored names are never reused, so content is immutable
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
