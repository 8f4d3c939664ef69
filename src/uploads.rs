use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// URL prefix under which stored images are served.
pub const SERVE_PREFIX: &str = "/uploads";

/// Image path recorded when a book is created with no file and no URL.
pub const PLACEHOLDER_IMAGE: &str = "/uploads/placeholder.png";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload not found: {0}")]
    NotFound(String),
    #[error("Invalid upload name: {0}")]
    InvalidName(String),
}

/// Flat local directory holding uploaded book images. Stored names carry a
/// random token prefix so concurrent uploads of the same filename cannot
/// collide.
pub struct UploadStore {
    base_path: PathBuf,
}

impl UploadStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Write an uploaded file and return the path it will be served from
    /// (e.g. "/uploads/<token>-cover.png").
    pub async fn save(&self, original_name: &str, data: Bytes) -> Result<String, UploadError> {
        let stored_name = format!(
            "{}-{}",
            uuid::Uuid::new_v4(),
            sanitize_filename(original_name)
        );
        let path = self.base_path.join(&stored_name);
        tokio::fs::write(&path, &data).await?;
        Ok(format!("{SERVE_PREFIX}/{stored_name}"))
    }

    /// Read a stored file by its stored name (the path segment after
    /// "/uploads/"). Rejects names that could escape the upload directory.
    pub async fn open(&self, stored_name: &str) -> Result<Bytes, UploadError> {
        if stored_name.is_empty()
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name.contains("..")
        {
            return Err(UploadError::InvalidName(stored_name.to_string()));
        }

        let path = self.base_path.join(stored_name);
        if !path.exists() {
            return Err(UploadError::NotFound(stored_name.to_string()));
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    pub async fn exists(&self, stored_name: &str) -> bool {
        self.base_path.join(stored_name).exists()
    }
}

/// Reduce a client-supplied filename to a safe final path component.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .replace("..", "");
    if base.is_empty() {
        "upload".to_string()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("cover.png"), "cover.png");
        assert_eq!(sanitize_filename("a/b/cover.png"), "cover.png");
        assert_eq!(sanitize_filename("..\\..\\cover.png"), "cover.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("a/b/"), "upload");
    }
}
