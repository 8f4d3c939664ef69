mod admin;
mod books;
mod notes;
mod uploads;

pub use admin::{admin_purge, health, welcome};
pub use books::{create_book, delete_book, get_book, list_books, update_book, update_status};
pub use books::{BookForm, StatusBody, Upload};
pub use notes::{create_note, delete_note, list_notes, CreateNoteRequest};
pub use uploads::serve_upload;
