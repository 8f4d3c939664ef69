//! booknest - A REST backend for tracking books you are reading
//!
//! This crate provides book CRUD, image attachment, and free-text notes with:
//! - redb embedded database for records (ACID, MVCC, crash-safe)
//! - Local upload directory for book cover images
//! - REST API with multipart and JSON request bodies

pub mod api;
pub mod config;
pub mod storage;
pub mod uploads;

use std::sync::Arc;

use config::Config;
use storage::Database;
use uploads::UploadStore;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub uploads: Arc<UploadStore>,
}
